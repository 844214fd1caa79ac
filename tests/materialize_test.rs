use fastbind::access::{ColumnDescriptor, DataType, MemoryRowSource, RowSchema, Value};
use fastbind::catalog::{FromValue, MemberDescriptor, MemberType, TargetDescriptor};
use fastbind::{BindError, BindingConfig, EntityBindingCompiler, RowMaterializer};
use rust_decimal::Decimal;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Item {
    id: i64,
    label: Option<String>,
}

fn item_target() -> TargetDescriptor<Item> {
    TargetDescriptor::new(Item::default)
        .member("Id", MemberType::Int64, |item: &mut Item, v: i64| item.id = v)
        .with_member(
            MemberDescriptor::assign("Label", MemberType::String, |item: &mut Item, v: Option<String>| {
                item.label = v
            })
            .nullable(),
        )
}

fn item_schema() -> RowSchema {
    RowSchema::new(vec![
        ColumnDescriptor::new("id", DataType::Int64).nullable(false),
        ColumnDescriptor::new("label", DataType::String).nullable(true),
    ])
}

fn item_rows() -> Vec<Vec<Value>> {
    vec![
        vec![Value::Int64(1), Value::from("one")],
        vec![Value::Int64(2), Value::Null],
        vec![Value::Int64(3), Value::from("three")],
    ]
}

#[test]
fn test_list_materialization_end_to_end() {
    init_logger();
    let compiler = EntityBindingCompiler::default();
    let materializer = RowMaterializer::new(&compiler);
    let mut source = MemoryRowSource::new(item_schema(), item_rows());

    let items = materializer.list(&item_target(), &mut source).unwrap();
    assert_eq!(
        items,
        vec![
            Item {
                id: 1,
                label: Some("one".to_string())
            },
            Item { id: 2, label: None },
            Item {
                id: 3,
                label: Some("three".to_string())
            },
        ]
    );
    assert!(source.is_closed());
}

#[test]
fn test_first_and_empty_result() {
    init_logger();
    let compiler = EntityBindingCompiler::default();
    let materializer = RowMaterializer::new(&compiler);

    let mut source = MemoryRowSource::new(item_schema(), item_rows());
    let first = materializer.first(&item_target(), &mut source).unwrap();
    assert_eq!(first.map(|item| item.id), Some(1));

    let mut empty = MemoryRowSource::new(item_schema(), vec![]);
    assert_eq!(materializer.first(&item_target(), &mut empty).unwrap(), None);
    assert!(empty.is_closed());
}

#[test]
fn test_dictionary_shapes() {
    init_logger();
    let materializer = RowMaterializer::new(EntityBindingCompiler::global());

    let mut source = MemoryRowSource::new(item_schema(), item_rows());
    let row = materializer.dictionary_one(&mut source).unwrap().unwrap();
    assert_eq!(row.get("id"), Some(&Value::Int64(1)));
    assert_eq!(row.get("label"), Some(&Value::from("one")));

    let mut source = MemoryRowSource::new(item_schema(), item_rows());
    let rows = materializer.dictionary_all(&mut source).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].get("label"), Some(&Value::Null));
    assert_eq!(
        rows[2].to_json(),
        serde_json::json!({"id": 3, "label": "three"})
    );
}

#[test]
fn test_multiple_result_sets_advance_before_closing() {
    init_logger();
    let compiler = EntityBindingCompiler::default();
    let materializer = RowMaterializer::new(&compiler);
    let counts = RowSchema::new(vec![ColumnDescriptor::new("total", DataType::Int32)]);
    let mut source = MemoryRowSource::new(item_schema(), item_rows())
        .with_result(counts, vec![vec![Value::Int32(3)]]);

    let items = materializer.list(&item_target(), &mut source).unwrap();
    assert_eq!(items.len(), 3);
    assert!(!source.is_closed());
    assert_eq!(source.next_result_calls(), 1);

    let total = materializer
        .first(&TargetDescriptor::<i64>::scalar(MemberType::Int64), &mut source)
        .unwrap();
    assert_eq!(total, Some(3));
    assert!(source.is_closed());
}

#[derive(Debug, Default, PartialEq)]
struct Reading {
    count: i32,
    amount: Decimal,
    raw: Value,
}

#[test]
fn test_numeric_normalization() {
    init_logger();
    let compiler = EntityBindingCompiler::default();
    let materializer = RowMaterializer::new(&compiler);
    let target = TargetDescriptor::new(Reading::default)
        .member("count", MemberType::Int32, |r: &mut Reading, v: i32| r.count = v)
        .member("amount", MemberType::Decimal, |r: &mut Reading, v: Decimal| {
            r.amount = v
        })
        .member("raw", MemberType::Object, |r: &mut Reading, v: Value| r.raw = v);
    let schema = RowSchema::new(vec![
        ColumnDescriptor::new("count", DataType::Float64),
        ColumnDescriptor::new("amount", DataType::Decimal),
        ColumnDescriptor::new("raw", DataType::Float64),
    ]);
    let mut source = MemoryRowSource::new(
        schema,
        vec![vec![
            Value::Float64(10.0),
            Value::Decimal(Decimal::new(1000, 2)),
            Value::Float64(2.5),
        ]],
    );

    let reading = materializer.first(&target, &mut source).unwrap().unwrap();
    assert_eq!(reading.count, 10);
    assert_eq!(reading.amount.to_string(), "10");
    assert_eq!(reading.raw, Value::Float64(2.5));
}

#[test]
fn test_numeric_normalization_rejects_fractions_for_integers() {
    init_logger();
    let compiler = EntityBindingCompiler::default();
    let materializer = RowMaterializer::new(&compiler);
    let target = TargetDescriptor::<i32>::scalar(MemberType::Int32);
    let schema = RowSchema::new(vec![ColumnDescriptor::new("n", DataType::Float64)]);
    let mut source = MemoryRowSource::new(schema, vec![vec![Value::Float64(1.5)]]);

    let err = materializer.list(&target, &mut source).unwrap_err();
    assert!(matches!(err, BindError::Conversion { .. }));
    // an error mid-materialization leaves the source for the caller
    assert!(!source.is_closed());
}

#[derive(Debug, PartialEq)]
struct Person {
    name: String,
    age: i32,
    code: i64,
}

fn person_target() -> TargetDescriptor<Person> {
    TargetDescriptor::positional(|args: Vec<Value>| -> anyhow::Result<Person> {
        let mut args = args.into_iter();
        let mut next = || args.next().unwrap_or_default();
        Ok(Person {
            name: String::from_value(next())?,
            age: i32::from_value(next())?,
            code: i64::from_value(next())?,
        })
    })
    .with_slot("name", MemberType::String)
    .with_slot("age", MemberType::Int32)
    .with_slot("code", MemberType::Int64)
}

#[test]
fn test_positional_target_with_placeholder_gap() {
    init_logger();
    let compiler = EntityBindingCompiler::default();
    let materializer = RowMaterializer::new(&compiler);
    let schema = RowSchema::new(vec![
        ColumnDescriptor::new("name", DataType::String),
        ColumnDescriptor::new("fast_args_index_2_marker", DataType::Int32),
    ]);
    let mut source = MemoryRowSource::new(schema, vec![vec![Value::from("ada"), Value::Int32(9)]]);

    let person = materializer.first(&person_target(), &mut source).unwrap().unwrap();
    assert_eq!(
        person,
        Person {
            name: "ada".to_string(),
            age: 0,
            code: 0
        }
    );
}

#[test]
fn test_positional_slots_follow_members_not_columns() {
    init_logger();
    let compiler = EntityBindingCompiler::default();
    let materializer = RowMaterializer::new(&compiler);
    let schema = RowSchema::new(vec![
        ColumnDescriptor::new("code", DataType::Int64),
        ColumnDescriptor::new("name", DataType::String),
        ColumnDescriptor::new("age", DataType::Int16),
    ]);
    let mut source = MemoryRowSource::new(
        schema,
        vec![vec![Value::Int64(77), Value::from("bo"), Value::Int16(40)]],
    );

    let people = materializer.list(&person_target(), &mut source).unwrap();
    assert_eq!(
        people,
        vec![Person {
            name: "bo".to_string(),
            age: 40,
            code: 77
        }]
    );
}

#[test]
fn test_custom_placeholder_prefix() {
    init_logger();
    let config = BindingConfig::from_json(r#"{"placeholder_prefix": "slot_"}"#).unwrap();
    let compiler = EntityBindingCompiler::new(config);
    let schema = RowSchema::new(vec![ColumnDescriptor::new("slot_7", DataType::Int32)]);
    let err = compiler.compile(&person_target(), &schema).unwrap_err();
    assert!(matches!(
        err,
        BindError::PlaceholderSlotOutOfRange {
            slot: 7,
            arity: 3,
            ..
        }
    ));
}

#[tokio::test]
async fn test_async_shapes_match_blocking() {
    init_logger();
    let compiler = EntityBindingCompiler::default();
    let materializer = RowMaterializer::new(&compiler);

    let mut source = MemoryRowSource::new(item_schema(), item_rows());
    let items = materializer
        .list_async(&item_target(), &mut source)
        .await
        .unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[1], Item { id: 2, label: None });
    assert!(source.is_closed());

    let mut source = MemoryRowSource::new(item_schema(), item_rows());
    let first = materializer
        .first_async(&item_target(), &mut source)
        .await
        .unwrap();
    assert_eq!(first.map(|item| item.id), Some(1));

    let mut source = MemoryRowSource::new(item_schema(), item_rows());
    let row = materializer.dictionary_one_async(&mut source).await.unwrap();
    assert_eq!(row.and_then(|r| r.get("label").cloned()), Some(Value::from("one")));

    let mut source = MemoryRowSource::new(RowSchema::default(), vec![vec![]]);
    let rows = materializer.dictionary_all_async(&mut source).await.unwrap();
    assert!(rows.is_empty());
    assert!(source.is_closed());
}
