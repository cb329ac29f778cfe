//! Contract floor: touches nothing, continues every phase

use crate::processor::RequestProcessor;

pub struct NoOpProcessor;

impl RequestProcessor for NoOpProcessor {
    fn name(&self) -> &str {
        "noop"
    }
}
