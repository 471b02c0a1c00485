//! 容器檔擷取元件
//!
//! 掃描內嵌影像標記、讀取拍攝資訊、以拍攝時間命名並寫出

mod counter;
mod extractor;
mod metadata_reader;
mod result;
mod rollover;
mod scanner;

pub use counter::count_container;
pub use extractor::ImageExtractor;
pub use metadata_reader::{CaptureMetadata, ExifReader, MetadataReader};
pub use result::{ContainerCount, CountSummary, ExtractionJobResult, ModuleTally};
pub use rollover::{DirectoryRollover, SharedRollover};
pub use scanner::{IMAGE_MARKER, find_markers, split_spans};
