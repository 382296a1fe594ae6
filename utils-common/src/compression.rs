use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::io::{self, Read};

/// 魔数常量 - 用于标识索引文件格式
pub const MAGIC_BYTES: &'static [u8] = b"PPCMP"; // PublicPress Compressed

/// 当前容器格式版本
pub const CONTAINER_VERSION: [u8; 2] = [1, 0];

/// 默认支持的最大主版本号
const DEFAULT_MAX_VERSION: u8 = 1;

/// 头部长度：魔数 + 版本号(2字节) + 原始数据大小(4字节)
const HEADER_LEN: usize = 5 + 2 + 4;

/// 将对象序列化为二进制格式
pub fn to_binary<T: serde::Serialize>(obj: &T) -> Result<Vec<u8>, io::Error> {
    bincode::serde::encode_to_vec(obj, bincode::config::standard())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("序列化失败: {}", e)))
}

/// 从二进制格式反序列化对象
pub fn from_binary<T: for<'a> serde::de::Deserialize<'a>>(data: &[u8]) -> Result<T, io::Error> {
    bincode::serde::decode_from_slice(data, bincode::config::standard())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("反序列化失败: {}", e)))
        .map(|(value, _)| value)
}

/// 将对象序列化为压缩的二进制容器格式
pub fn to_compressed<T: serde::Serialize>(obj: &T, version: [u8; 2]) -> Result<Vec<u8>, io::Error> {
    let binary = to_binary(obj)?;

    // 写入头部：魔数、版本号、原始数据大小
    let mut output = Vec::with_capacity(HEADER_LEN + binary.len() / 2);
    output.extend_from_slice(MAGIC_BYTES);
    output.extend_from_slice(&version);
    output.extend_from_slice(&(binary.len() as u32).to_le_bytes());

    // 压缩数据并追加
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    std::io::Write::write_all(&mut encoder, &binary)?;
    let compressed_data = encoder.finish()?;
    output.extend_from_slice(&compressed_data);

    Ok(output)
}

/// 从压缩的二进制容器反序列化对象，使用默认最大版本
pub fn from_compressed<T: for<'a> serde::de::Deserialize<'a>>(data: &[u8]) -> Result<T, io::Error> {
    from_compressed_with_max_version(data, DEFAULT_MAX_VERSION)
}

/// 从压缩的二进制容器反序列化对象，允许指定支持的最大版本
pub fn from_compressed_with_max_version<T: for<'a> serde::de::Deserialize<'a>>(
    data: &[u8],
    max_version: u8,
) -> Result<T, io::Error> {
    let (_, original_size) = parse_header(data, max_version)?;

    // 解压头部之后的数据
    let mut decoder = GzDecoder::new(&data[HEADER_LEN..]);
    let mut decompressed_data = Vec::with_capacity(original_size as usize);
    decoder.read_to_end(&mut decompressed_data)?;

    // 校验解压后的数据大小
    if decompressed_data.len() != original_size as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "解压后数据大小不匹配: 期望 {} 字节, 实际 {} 字节",
                original_size,
                decompressed_data.len()
            ),
        ));
    }

    from_binary(&decompressed_data)
}

/// 验证压缩数据是否有效，返回容器版本号
pub fn validate_compressed_data(data: &[u8]) -> Result<[u8; 2], io::Error> {
    validate_compressed_data_with_max_version(data, DEFAULT_MAX_VERSION)
}

/// 验证压缩数据是否有效，允许指定支持的最大版本
pub fn validate_compressed_data_with_max_version(
    data: &[u8],
    max_version: u8,
) -> Result<[u8; 2], io::Error> {
    parse_header(data, max_version).map(|(version, _)| version)
}

/// 解析并校验容器头部，返回版本号和原始数据大小
fn parse_header(data: &[u8], max_version: u8) -> Result<([u8; 2], u32), io::Error> {
    if data.len() < HEADER_LEN {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("数据太短，无法解析: {} 字节", data.len()),
        ));
    }

    if &data[0..MAGIC_BYTES.len()] != MAGIC_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "无效的文件格式：魔数不匹配",
        ));
    }

    let version_offset = MAGIC_BYTES.len();
    let version = [data[version_offset], data[version_offset + 1]];
    if version[0] > max_version {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("不支持的版本: {}.{}", version[0], version[1]),
        ));
    }

    let size_offset = version_offset + 2;
    let mut size_bytes = [0u8; 4];
    size_bytes.copy_from_slice(&data[size_offset..size_offset + 4]);
    let original_size = u32::from_le_bytes(size_bytes);

    Ok((version, original_size))
}
