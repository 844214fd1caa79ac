//! Call interception hooks.

use crate::access::Value;
use crate::expression::MethodCall;

/// Hooks fired around every method call the evaluator performs.
///
/// Both hooks are optional; the defaults leave the call untouched.
pub trait CallInterceptor {
    /// Runs before the invocation. Returning `Some` replaces the call result
    /// and the method itself is never invoked.
    fn before_call(&self, receiver: Option<&Value>, call: &MethodCall) -> Option<Value> {
        let _ = (receiver, call);
        None
    }

    /// Runs after the invocation and may replace its result
    fn after_call(&self, receiver: Option<&Value>, result: Value, call: &MethodCall) -> Value {
        let _ = (receiver, call);
        result
    }
}

type BeforeHook<'a> = Box<dyn Fn(Option<&Value>, &MethodCall) -> Option<Value> + 'a>;
type AfterHook<'a> = Box<dyn Fn(Option<&Value>, Value, &MethodCall) -> Value + 'a>;

/// Closure-backed [`CallInterceptor`]
#[derive(Default)]
pub struct CallHooks<'a> {
    before: Option<BeforeHook<'a>>,
    after: Option<AfterHook<'a>>,
}

impl<'a> CallHooks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before(
        mut self,
        hook: impl Fn(Option<&Value>, &MethodCall) -> Option<Value> + 'a,
    ) -> Self {
        self.before = Some(Box::new(hook));
        self
    }

    pub fn after(mut self, hook: impl Fn(Option<&Value>, Value, &MethodCall) -> Value + 'a) -> Self {
        self.after = Some(Box::new(hook));
        self
    }
}

impl CallInterceptor for CallHooks<'_> {
    fn before_call(&self, receiver: Option<&Value>, call: &MethodCall) -> Option<Value> {
        self.before.as_ref().and_then(|hook| hook(receiver, call))
    }

    fn after_call(&self, receiver: Option<&Value>, result: Value, call: &MethodCall) -> Value {
        match &self.after {
            Some(hook) => hook(receiver, result, call),
            None => result,
        }
    }
}
