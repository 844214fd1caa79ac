use fastbind::access::{ColumnDescriptor, DataType, MemoryRowSource, RowSchema, RowSource, Value};
use fastbind::binding::{BindingCache, CacheStore};
use fastbind::catalog::{MemberType, TargetDescriptor};
use fastbind::EntityBindingCompiler;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Default)]
struct Account {
    id: i64,
    owner: String,
}

fn account_target() -> TargetDescriptor<Account> {
    TargetDescriptor::new(Account::default)
        .member("id", MemberType::Int64, |a: &mut Account, v: i64| a.id = v)
        .member("owner", MemberType::String, |a: &mut Account, v: String| {
            a.owner = v
        })
}

fn account_schema() -> RowSchema {
    RowSchema::new(vec![
        ColumnDescriptor::new("id", DataType::Int64).nullable(false),
        ColumnDescriptor::new("owner", DataType::String),
    ])
}

#[test]
fn test_same_shape_reuses_binder() {
    let compiler = EntityBindingCompiler::default();
    let first = compiler.compile(&account_target(), &account_schema()).unwrap();
    let second = compiler.compile(&account_target(), &account_schema()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let stats = compiler.cache().stats();
    assert_eq!(stats.compilations, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.size, 1);
}

#[test]
fn test_nullability_is_part_of_the_shape() {
    let compiler = EntityBindingCompiler::default();
    let strict = compiler.compile(&account_target(), &account_schema()).unwrap();
    let relaxed_schema = RowSchema::new(vec![
        ColumnDescriptor::new("id", DataType::Int64).nullable(true),
        ColumnDescriptor::new("owner", DataType::String),
    ]);
    let relaxed = compiler.compile(&account_target(), &relaxed_schema).unwrap();
    assert!(!Arc::ptr_eq(&strict, &relaxed));
    assert_ne!(strict.fingerprint(), relaxed.fingerprint());
    assert_eq!(compiler.cache().stats().size, 2);
}

#[test]
fn test_concurrent_compilation_happens_once() {
    let compiler = EntityBindingCompiler::default();
    let target = account_target();
    let schema = account_schema();

    let binders: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| compiler.compile(&target, &schema).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(compiler.cache().stats().compilations, 1);
    assert!(binders.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn test_shared_cache_across_compilers() {
    let cache = Arc::new(BindingCache::new());
    let a = EntityBindingCompiler::default().with_cache(cache.clone());
    let b = EntityBindingCompiler::default().with_cache(cache.clone());

    let first = a.compile(&account_target(), &account_schema()).unwrap();
    let second = b.compile(&account_target(), &account_schema()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.stats().compilations, 1);

    cache.clear();
    assert_eq!(cache.stats().size, 0);
}

#[test]
fn test_failed_compilation_is_not_cached() {
    let compiler = EntityBindingCompiler::default();
    let schema = RowSchema::new(vec![ColumnDescriptor::new("id", DataType::Guid)]);
    assert!(compiler.compile(&account_target(), &schema).is_err());
    assert!(compiler.compile(&account_target(), &schema).is_err());

    let stats = compiler.cache().stats();
    assert_eq!(stats.compilations, 0);
    assert_eq!(stats.misses, 2);
}

#[test]
fn test_cached_binder_binds_rows() {
    let compiler = EntityBindingCompiler::default();
    let binder = compiler.compile(&account_target(), &account_schema()).unwrap();
    let mut source = MemoryRowSource::new(
        account_schema(),
        vec![vec![Value::Int64(4), Value::from("kim")]],
    );
    assert!(source.read().unwrap());

    let account = binder.bind(&source).unwrap();
    assert_eq!(account.id, 4);
    assert_eq!(account.owner, "kim");
    assert_eq!(binder.column_count(), 2);
}
