//! Base62 短码编解码
//!
//! 把 128 位标识符视为大端无符号整数，按 62 进制渲染成短码。
//! 字母表顺序：数字、小写字母、大写字母；不做定长填充。

use uuid::Uuid;

use crate::errors::{Result, ShortenerError};

const BASE62_CHARS: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: u128 = 62;

/// 128 位整数的 62 进制最大位数
const MAX_CODE_LEN: usize = 22;

/// 合法标识符解码后的最小字节长度
const MIN_DECODED_BYTES: usize = 16;

/// Encode an identifier as a base62 short code.
pub fn encode(id: Uuid) -> String {
    let mut num = id.as_u128();
    let mut buf = [0u8; MAX_CODE_LEN];
    let mut n = buf.len();

    while num > 0 {
        n -= 1;
        buf[n] = BASE62_CHARS[(num % BASE) as usize];
        num /= BASE;
    }

    // buf 只包含 ASCII 字符
    buf[n..].iter().map(|&b| b as char).collect()
}

/// Decode a base62 short code back into its identifier.
///
/// Fails on any character outside the alphabet, on values that do not fit in
/// 128 bits, and on values whose significant byte length is below 16.
pub fn decode(code: &str) -> Result<Uuid> {
    let mut num: u128 = 0;

    for ch in code.chars() {
        let index = char_index(ch)
            .ok_or_else(|| ShortenerError::decode(format!("invalid base62 character: {}", ch)))?;

        num = num
            .checked_mul(BASE)
            .and_then(|v| v.checked_add(index as u128))
            .ok_or_else(|| {
                ShortenerError::decode(format!("short code overflows 128 bits: {}", code))
            })?;
    }

    let byte_len = significant_bytes(num);
    if byte_len < MIN_DECODED_BYTES {
        return Err(ShortenerError::decode(format!(
            "invalid identifier length: {}",
            byte_len
        )));
    }

    Ok(Uuid::from_u128(num))
}

/// Whether `encode` followed by `decode` restores this identifier.
///
/// Identifiers whose leading byte is zero decode to fewer than 16 bytes and
/// are rejected, so generators must skip them.
pub fn is_encodable(id: Uuid) -> bool {
    id.as_bytes()[0] != 0
}

fn char_index(ch: char) -> Option<usize> {
    match ch {
        '0'..='9' => Some(ch as usize - '0' as usize),
        'a'..='z' => Some(ch as usize - 'a' as usize + 10),
        'A'..='Z' => Some(ch as usize - 'A' as usize + 36),
        _ => None,
    }
}

fn significant_bytes(num: u128) -> usize {
    16 - (num.leading_zeros() as usize) / 8
}
