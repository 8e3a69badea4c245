//! PCM → WAV 编码
//!
//! 把生成端返回的原始小端 16 位单声道 PCM 包装为可直接播放的 WAV
//! 容器。44 字节头的字节布局是对外契约：多字节整数字段一律小端，
//! 四字符标签为 ASCII，两个长度字段由实际负载长度计算得出。
//! 不做压缩、不做重采样、不做声道混合。

use thiserror::Error;

/// WAV 头固定长度
pub const WAV_HEADER_LEN: usize = 44;

/// 每个样本的字节数（16 位单声道）
const BYTES_PER_SAMPLE: usize = 2;

#[derive(Debug, Error)]
pub enum PcmError {
    /// 字节数为奇数意味着截断了半个样本，由调用方先行拒绝
    #[error("PCM 数据长度为奇数 ({0} 字节), 含不完整样本")]
    OddSampleData(usize),

    #[error("采样率不能为 0")]
    ZeroSampleRate,

    #[error("WAV 数据过短: {0} 字节")]
    TooShort(usize),

    #[error("无效的 WAV: 缺少 {0}")]
    MissingChunk(&'static str),
}

/// 编码为 WAV 容器
///
/// 头部字段: format tag = 1 (PCM), 声道 = 1, 位深 = 16,
/// byte rate = sample_rate * 2, block align = 2,
/// RIFF 长度 = 36 + 负载长度, data 长度 = 负载长度。
pub fn encode_wav(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>, PcmError> {
    if pcm.len() % BYTES_PER_SAMPLE != 0 {
        return Err(PcmError::OddSampleData(pcm.len()));
    }
    if sample_rate == 0 {
        return Err(PcmError::ZeroSampleRate);
    }

    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * BYTES_PER_SAMPLE as u32;
    let block_align = BYTES_PER_SAMPLE as u16;
    let data_size = pcm.len();
    let riff_size = 36 + data_size;

    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + data_size);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(riff_size as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    wav.extend_from_slice(&num_channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data_size as u32).to_le_bytes());
    wav.extend_from_slice(pcm);

    Ok(wav)
}

/// WAV 头信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavInfo {
    pub format_tag: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_start: usize,
    pub data_size: usize,
}

/// 解析 WAV 头
///
/// 按 chunk 扫描 fmt 与 data，兼容含附加 chunk 的文件
pub fn parse_wav_header(data: &[u8]) -> Result<WavInfo, PcmError> {
    if data.len() < WAV_HEADER_LEN {
        return Err(PcmError::TooShort(data.len()));
    }
    if &data[0..4] != b"RIFF" {
        return Err(PcmError::MissingChunk("RIFF header"));
    }
    if &data[8..12] != b"WAVE" {
        return Err(PcmError::MissingChunk("WAVE identifier"));
    }

    let mut pos = 12;
    let mut fmt: Option<(u16, u16, u32, u32, u16, u16)> = None;

    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size =
            u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]])
                as usize;

        match chunk_id {
            b"fmt " => {
                if chunk_size < 16 || pos + 8 + 16 > data.len() {
                    return Err(PcmError::MissingChunk("fmt chunk"));
                }
                let f = &data[pos + 8..pos + 24];
                fmt = Some((
                    u16::from_le_bytes([f[0], f[1]]),
                    u16::from_le_bytes([f[2], f[3]]),
                    u32::from_le_bytes([f[4], f[5], f[6], f[7]]),
                    u32::from_le_bytes([f[8], f[9], f[10], f[11]]),
                    u16::from_le_bytes([f[12], f[13]]),
                    u16::from_le_bytes([f[14], f[15]]),
                ));
            }
            b"data" => {
                let (format_tag, num_channels, sample_rate, byte_rate, block_align, bits) =
                    fmt.ok_or(PcmError::MissingChunk("fmt chunk"))?;
                return Ok(WavInfo {
                    format_tag,
                    num_channels,
                    sample_rate,
                    byte_rate,
                    block_align,
                    bits_per_sample: bits,
                    data_start: pos + 8,
                    data_size: chunk_size,
                });
            }
            _ => {}
        }

        pos += 8 + chunk_size;
        // 对齐到偶数字节
        if chunk_size % 2 != 0 {
            pos += 1;
        }
    }

    Err(PcmError::MissingChunk("data chunk"))
}
