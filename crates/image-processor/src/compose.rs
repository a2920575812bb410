//! Image composition: alpha overlay of one image onto another.

use image::{DynamicImage, Rgba, RgbaImage};

/// Overlay `top` onto `base` with its top-left corner at (`x`, `y`).
///
/// Uses Porter-Duff "over". Offsets may be negative; pixels that land
/// outside `base` are clipped.
pub fn overlay(base: &mut RgbaImage, top: &DynamicImage, x: i64, y: i64) {
    let top_rgba = top.to_rgba8();
    let (base_w, base_h) = (i64::from(base.width()), i64::from(base.height()));

    for (dx, dy, pixel) in top_rgba.enumerate_pixels() {
        let (Some(target_x), Some(target_y)) =
            (x.checked_add(i64::from(dx)), y.checked_add(i64::from(dy)))
        else {
            continue;
        };
        if target_x < 0 || target_y < 0 || target_x >= base_w || target_y >= base_h {
            continue;
        }
        let (tx, ty) = (target_x as u32, target_y as u32);

        match pixel[3] {
            0 => {}
            255 => base.put_pixel(tx, ty, *pixel),
            _ => {
                let bg = base.get_pixel(tx, ty);
                let blended = blend_over(bg, pixel);
                base.put_pixel(tx, ty, blended);
            }
        }
    }
}

fn blend_over(bg: &Rgba<u8>, fg: &Rgba<u8>) -> Rgba<u8> {
    let fa = f32::from(fg[3]) / 255.0;
    let ba = f32::from(bg[3]) / 255.0;
    let out_a = fa + ba * (1.0 - fa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |i: usize| {
        let c = (f32::from(fg[i]) * fa + f32::from(bg[i]) * ba * (1.0 - fa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
