use std::ops::Range;

/// 內嵌影像的起始標記：JPEG SOI 緊接 APP1 (EXIF)
pub const IMAGE_MARKER: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE1];

/// 找出所有不重疊的標記位置
///
/// 每次命中後從標記結尾繼續搜尋；找不到任何標記時回傳空列表
#[must_use]
pub fn find_markers(buffer: &[u8], marker: &[u8]) -> Vec<usize> {
    let mut offsets = Vec::new();
    let Some(&first) = marker.first() else {
        return offsets;
    };

    let mut position = 0;
    while position + marker.len() <= buffer.len() {
        let Some(relative) = buffer[position..].iter().position(|&b| b == first) else {
            break;
        };

        let candidate = position + relative;
        let end = candidate + marker.len();
        if end > buffer.len() {
            break;
        }

        if &buffer[candidate..end] == marker {
            offsets.push(candidate);
            position = end;
        } else {
            position = candidate + 1;
        }
    }

    offsets
}

/// 將標記位置轉為區段 `[offset_i, offset_{i+1})`，最後一段延伸到緩衝區結尾
#[must_use]
pub fn split_spans(buffer_len: usize, offsets: &[usize]) -> Vec<Range<usize>> {
    offsets
        .iter()
        .enumerate()
        .map(|(i, &start)| start..offsets.get(i + 1).copied().unwrap_or(buffer_len))
        .collect()
}
