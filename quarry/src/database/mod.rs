#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;

use crate::cursor::Cursor;
use crate::value::Value;
use crate::QuarryResult;

///
/// Something generated query functions can run SQL against.
///
/// `args` are bound positionally to the placeholders of `sql`.
///
#[async_trait]
pub trait Connection: Send + Sync {
    async fn query(&self, sql: &str, args: &[Value]) -> QuarryResult<Box<dyn Cursor + Send>>;

    /// The bind parameter syntax for the 1-based parameter `index`.
    fn placeholder(&self, _index: usize) -> String {
        "?".to_owned()
    }
}
