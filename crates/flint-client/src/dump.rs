//! 诊断用字节转储：以固定宽度的十六进制/ASCII 双栏渲染任意字节序列。
//!
//! 主要用于记录与排查捕获到的协议帧；纯函数、无状态、对任意输入有定义。

use alloc::string::String;
use core::fmt::Write as _;

/// 每行渲染的字节数。
const BYTES_PER_LINE: usize = 16;
/// 十六进制栏的固定宽度：16 组两位数字加 15 个间隔空格。
const HEX_COLUMN_WIDTH: usize = BYTES_PER_LINE * 3 - 1;
/// 十六进制栏与字符栏之间的固定间隙。
const COLUMN_GAP: &str = "     ";

/// 把字节序列渲染为十六进制/ASCII 双栏转储。
///
/// # 契约说明（What）
/// - **分行**：输入按连续 16 字节切块，末块允许更短；空输入产出空字符串；
/// - **十六进制栏**：两位大写十六进制、空格分隔，左对齐补空格到 47 列；
/// - **字符栏**：可打印 ASCII（`0x20..=0x7E`）原样显示，其余字节显示为单个空格；
/// - **行尾**：每行以换行符结尾，按输入顺序拼接。
///
/// # 示例（Examples）
/// ```rust
/// use flint_client::dump::hex_dump;
///
/// assert_eq!(hex_dump(&[]), "");
///
/// let line = hex_dump(b"SELECT 1");
/// assert!(line.starts_with("53 45 4C 45 43 54 20 31"));
/// assert!(line.ends_with("SELECT 1\n"));
/// ```
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut output = String::new();
    for chunk in bytes.chunks(BYTES_PER_LINE) {
        let mut hex_column = String::with_capacity(HEX_COLUMN_WIDTH);
        for (index, byte) in chunk.iter().enumerate() {
            if index > 0 {
                hex_column.push(' ');
            }
            let _ = write!(hex_column, "{byte:02X}");
        }
        // 左对齐补空到固定栏宽；写入 String 不会失败。
        let _ = write!(output, "{hex_column:<HEX_COLUMN_WIDTH$}{COLUMN_GAP}");
        for byte in chunk {
            output.push(printable(*byte));
        }
        output.push('\n');
    }
    output
}

/// 可打印 ASCII 原样返回，其余字节折叠为空格。
fn printable(byte: u8) -> char {
    if (0x20..=0x7E).contains(&byte) {
        byte as char
    } else {
        ' '
    }
}
