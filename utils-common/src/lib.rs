pub mod compression;
pub mod models;

// 重新导出常用模块和函数，方便直接使用
pub use compression::{
    from_binary, from_compressed, to_binary, to_compressed, validate_compressed_data,
    CONTAINER_VERSION,
};
pub use models::{Author, StoryMetadata};
