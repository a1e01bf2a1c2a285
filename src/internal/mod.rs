//! Internal implementation details.

mod dispose_bag;

pub(crate) use dispose_bag::DisposeBag;
pub use dispose_bag::BoxFutureUnit;
