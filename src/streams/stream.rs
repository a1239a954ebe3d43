use crate::core::instance_header::InstanceHeader;
use crate::core::instances::DenseInstance;
use crate::error::Result;
use std::sync::Arc;

pub trait Stream {
    fn header(&self) -> &Arc<InstanceHeader>;
    fn has_more_instances(&self) -> bool;
    /// `None` once the stream is exhausted. A row that cannot be turned into an
    /// instance yields `Some(Err(..))` and the stream moves past it.
    fn next_instance(&mut self) -> Option<Result<DenseInstance>>;
}
