//! Content identifier codec / 内容标识符编解码
//!
//! A document is addressed on the wire by a URL-safe base64 pair:
//! `id` encodes the binary resource locator, `part` encodes the internal
//! part path (attachment inside a container document). Decoding is strict:
//! anything that is not the exact inverse of `encode` is rejected with
//! `InvalidIdentifier`, never a panic.
//! 文档在 URL 中由一对 URL-safe base64 标识：`id` 编码二进制定位符，
//! `part` 编码容器内部路径。解码是严格的，非法输入一律拒绝。

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;

use crate::error::GatewayError;

/// Encode a binary resource locator / 编码二进制定位符
pub fn encode_locator(locator: &[u8]) -> String {
    URL_SAFE.encode(locator)
}

/// Decode a wire `id` back to the binary locator / 解码 `id` 为二进制定位符
pub fn decode_locator(id: &str) -> Result<Vec<u8>, GatewayError> {
    URL_SAFE
        .decode(id)
        .map_err(|_| GatewayError::InvalidIdentifier("id"))
}

/// Encode an internal part path; empty path encodes to the empty string
/// 编码内部路径，空路径编码为空字符串
pub fn encode_part(part: &str) -> String {
    if part.is_empty() {
        String::new()
    } else {
        URL_SAFE.encode(part.as_bytes())
    }
}

/// Decode a wire `part` back to the internal path / 解码 `part` 为内部路径
///
/// Must be valid base64 AND valid UTF-8; either failure is the client's.
pub fn decode_part(part_id: &str) -> Result<String, GatewayError> {
    let raw = URL_SAFE
        .decode(part_id)
        .map_err(|_| GatewayError::InvalidIdentifier("part"))?;
    String::from_utf8(raw).map_err(|_| GatewayError::InvalidIdentifier("part"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_round_trip() {
        let cases: &[&[u8]] = &[
            b"",
            b"file:///tmp/a.txt",
            b"file:///home/user/\xe6\x96\x87\xe6\xa1\xa3.pdf",
            &[0u8, 255, 13, 10, 128],
        ];
        for &case in cases {
            let encoded = encode_locator(case);
            assert_eq!(decode_locator(&encoded).unwrap(), case);
        }
    }

    #[test]
    fn test_part_round_trip() {
        for case in ["", "attachment/1", "页/3", "a b.eml:2"] {
            let encoded = encode_part(case);
            assert_eq!(decode_part(&encoded).unwrap(), case);
        }
    }

    #[test]
    fn test_encoding_is_url_safe() {
        // 0xfb 0xff 在标准 base64 里会产生 '+' 和 '/'
        let encoded = encode_locator(&[0xfb, 0xef, 0xff]);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
    }

    #[test]
    fn test_empty_part_encodes_empty() {
        assert_eq!(encode_part(""), "");
        assert_eq!(decode_part("").unwrap(), "");
    }

    #[test]
    fn test_decode_rejects_malformed_base64() {
        assert!(matches!(
            decode_locator("not!!base64"),
            Err(GatewayError::InvalidIdentifier("id"))
        ));
        assert!(matches!(
            decode_part("%%%"),
            Err(GatewayError::InvalidIdentifier("part"))
        ));
    }

    #[test]
    fn test_decode_part_rejects_invalid_utf8() {
        // 合法 base64，但解出的字节不是 UTF-8
        let bogus = URL_SAFE.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(
            decode_part(&bogus),
            Err(GatewayError::InvalidIdentifier("part"))
        ));
    }

    #[test]
    fn test_standard_alphabet_rejected() {
        // '+' 和 '/' 属于标准字母表，不属于 URL-safe 字母表
        assert!(decode_locator("+/+/").is_err());
    }
}
