//! Native side of a binding: declarations, implementations and the call
//! context they run in.

mod call_context;
mod declaration;
mod native_fn;
mod types;

pub use call_context::{CallContext, NativeArg, NativeReturn};
pub use declaration::{Modifiers, NativeMethod, NativeParam, ParamFlags};
pub use native_fn::{NativeCallable, NativeFn};
pub use types::{NativeType, VALUE_ARRAY};
