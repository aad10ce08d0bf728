pub mod info;
pub mod merge;
pub mod roots;
pub mod scan;

pub use info::*;
pub use merge::*;
pub use roots::*;
pub use scan::*;
