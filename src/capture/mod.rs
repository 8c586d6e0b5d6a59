pub mod cleaner;
pub mod normalizer;
pub mod raw;
pub mod router;

pub use cleaner::{clean, is_valid};
pub use normalizer::{canonical_attribute, normalize_key, CanonicalAttribute};
pub use raw::RawCapture;
pub use router::{route_capture, RoutedCapture};
