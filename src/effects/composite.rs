use crate::effects::transitions::WipeDir;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

pub fn crossfade(a: PremulRgba8, b: PremulRgba8, t: f32) -> PremulRgba8 {
    let t = t.clamp(0.0, 1.0);
    let tt = ((t * 255.0).round() as i32).clamp(0, 255) as u16;
    let it = 255u16 - tt;

    let mut out = [0u8; 4];
    for i in 0..4 {
        let av = mul_div255(u16::from(a[i]), it);
        let bv = mul_div255(u16::from(b[i]), tt);
        out[i] = av.saturating_add(bv);
    }
    out
}

/// Write the blend of `a` towards `b` at progress `t` into `dst`.
pub fn crossfade_into(dst: &mut [u8], a: &[u8], b: &[u8], t: f32) -> ReelResult<()> {
    if dst.len() != a.len() || dst.len() != b.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "crossfade_into expects equal-length rgba8 buffers",
        ));
    }
    for ((d, a), b) in dst
        .chunks_exact_mut(4)
        .zip(a.chunks_exact(4))
        .zip(b.chunks_exact(4))
    {
        let out = crossfade([a[0], a[1], a[2], a[3]], [b[0], b[1], b[2], b[3]], t);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[derive(Clone, Copy, Debug)]
pub struct WipeParams {
    pub width: u32,
    pub height: u32,
    pub t: f32,
    pub dir: WipeDir,
    pub soft_edge: f32,
}

/// Write a wipe from `a` to `b` into `dst`. At `t = 0` the frame is all `a`.
pub fn wipe_into(dst: &mut [u8], a: &[u8], b: &[u8], params: WipeParams) -> ReelResult<()> {
    let WipeParams {
        width,
        height,
        t,
        dir,
        soft_edge,
    } = params;
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| ReelError::validation("wipe buffer size overflow"))?;

    if dst.len() != expected_len || a.len() != expected_len || b.len() != expected_len {
        return Err(ReelError::validation(
            "wipe_into expects buffers matching width*height*4",
        ));
    }

    let t = t.clamp(0.0, 1.0);
    let axis_len = match dir {
        WipeDir::LeftToRight | WipeDir::RightToLeft => width as f32,
        WipeDir::TopToBottom | WipeDir::BottomToTop => height as f32,
    };
    let soft_px = soft_edge.max(0.0) * axis_len;
    let edge = t * (axis_len + 2.0 * soft_px) - soft_px;

    for y in 0..height {
        for x in 0..width {
            let pos = match dir {
                WipeDir::LeftToRight => x as f32,
                WipeDir::RightToLeft => (width - 1 - x) as f32,
                WipeDir::TopToBottom => y as f32,
                WipeDir::BottomToTop => (height - 1 - y) as f32,
            };

            // m is the weight of the incoming image at this pixel.
            let m = if soft_px <= 0.0 {
                if pos < edge { 1.0 } else { 0.0 }
            } else {
                1.0 - smoothstep(edge - soft_px, edge + soft_px, pos)
            };

            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            let ap = [a[idx], a[idx + 1], a[idx + 2], a[idx + 3]];
            let bp = [b[idx], b[idx + 1], b[idx + 2], b[idx + 3]];
            dst[idx..idx + 4].copy_from_slice(&crossfade(ap, bp, m));
        }
    }

    Ok(())
}

/// Composite a premultiplied `src` rectangle over `dst` with its top-left corner at `(x, y)`.
///
/// Pixels falling outside `dst` are skipped.
pub fn over_region(
    dst: &mut [u8],
    dst_width: u32,
    dst_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    x: i64,
    y: i64,
) -> ReelResult<()> {
    if dst.len() != dst_width as usize * dst_height as usize * 4
        || src.len() != src_width as usize * src_height as usize * 4
    {
        return Err(ReelError::validation(
            "over_region expects buffers matching their declared sizes",
        ));
    }

    for sy in 0..src_height as i64 {
        let dy = y + sy;
        if dy < 0 || dy >= i64::from(dst_height) {
            continue;
        }
        for sx in 0..src_width as i64 {
            let dx = x + sx;
            if dx < 0 || dx >= i64::from(dst_width) {
                continue;
            }
            let si = ((sy as usize) * (src_width as usize) + sx as usize) * 4;
            let s = [src[si], src[si + 1], src[si + 2], src[si + 3]];
            if s[3] == 0 {
                continue;
            }
            let di = ((dy as usize) * (dst_width as usize) + dx as usize) * 4;
            let d = [dst[di], dst[di + 1], dst[di + 2], dst[di + 3]];
            dst[di..di + 4].copy_from_slice(&over(d, s));
        }
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn smoothstep(a: f32, b: f32, x: f32) -> f32 {
    if x <= a {
        return 0.0;
    }
    if x >= b {
        return 1.0;
    }
    let t = (x - a) / (b - a);
    (t * t * (3.0 - 2.0 * t)).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
