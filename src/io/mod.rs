//! Construction from and output to external encodings.

pub mod coords;
pub mod geojson;
pub mod wkb;
pub mod wkt;

pub use self::wkb::{from_wkb, to_wkb};
pub use self::wkt::{from_wkt, to_wkt, WktOptions};
