use sp_core::{Image, ImageView};

/// 3x3 erosion: a pixel stays set only if its full 3x3 neighborhood is set.
/// Neighbors outside the image count as unset.
pub fn erode3x3(src: &ImageView<'_, u8>) -> Image<u8> {
    map3x3(src, |neighbors| neighbors.iter().all(|&v| v.is_some_and(|p| p > 0)))
}

/// 3x3 dilation: a pixel becomes set if any pixel in its 3x3 neighborhood is
/// set. Neighbors outside the image are ignored.
pub fn dilate3x3(src: &ImageView<'_, u8>) -> Image<u8> {
    map3x3(src, |neighbors| neighbors.iter().any(|&v| v.is_some_and(|p| p > 0)))
}

pub fn open3x3(src: &ImageView<'_, u8>) -> Image<u8> {
    let eroded = erode3x3(src);
    dilate3x3(&eroded.as_view())
}

pub fn close3x3(src: &ImageView<'_, u8>) -> Image<u8> {
    let dilated = dilate3x3(src);
    erode3x3(&dilated.as_view())
}

fn map3x3(src: &ImageView<'_, u8>, set: impl Fn(&[Option<u8>; 9]) -> bool) -> Image<u8> {
    let (w, h) = (src.width(), src.height());
    let mut data = Vec::with_capacity(w * h);

    for y in 0..h {
        for x in 0..w {
            let mut neighbors = [None; 9];
            for dy in 0..3usize {
                for dx in 0..3usize {
                    let nx = (x + dx).checked_sub(1);
                    let ny = (y + dy).checked_sub(1);
                    neighbors[dy * 3 + dx] = match (nx, ny) {
                        (Some(nx), Some(ny)) => src.get(nx, ny).copied(),
                        _ => None,
                    };
                }
            }
            data.push(if set(&neighbors) { 255 } else { 0 });
        }
    }

    Image::from_vec(w, h, data).expect("output matches source dimensions")
}
