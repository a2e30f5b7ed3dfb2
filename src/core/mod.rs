// Domain-layer modules and shared errors/models
pub mod consolidation {
    pub use crate::consolidation::*;
}

pub mod field_filter {
    pub use crate::field_filter::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod sales_sync {
    pub use crate::sales_sync::*;
}

pub mod errors {
    pub use crate::errors::*;
}
