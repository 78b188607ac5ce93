use crate::foundation::error::{CaptionError, CaptionResult};
use crate::foundation::math::mul_div255_u8;

/// Per-layer blend mode used when compositing a layer over what is already drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Plain source-over.
    #[default]
    Normal,
    /// `s * d`.
    Multiply,
    /// `s + d - s * d`.
    Screen,
    /// Multiply or screen depending on the destination.
    Overlay,
    /// `min(s, d)`.
    Darken,
    /// `max(s, d)`.
    Lighten,
    /// `|d - s|`.
    Difference,
    /// `d + s - 2ds`.
    Exclusion,
    /// Keep the destination except where the source is opaque ("destination-out").
    DestinationOut,
}

/// Composite premultiplied `src` onto premultiplied `dst` with the given blend mode.
pub fn composite_in_place(
    dst: &mut [u8],
    src: &[u8],
    mode: BlendMode,
    opacity: f32,
) -> CaptionResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(CaptionError::render(
            "composite expects equal-length rgba8 buffers",
        ));
    }

    // Dispatch once per call, not per pixel.
    match mode {
        BlendMode::Normal => over_in_place(dst, src, opacity),
        BlendMode::DestinationOut => destination_out_in_place(dst, src, opacity),
        BlendMode::Multiply => blend_in_place(dst, src, opacity, |s, d| s * d),
        BlendMode::Screen => blend_in_place(dst, src, opacity, |s, d| s + d - s * d),
        BlendMode::Overlay => blend_in_place(dst, src, opacity, |s, d| {
            if d <= 0.5 {
                2.0 * s * d
            } else {
                1.0 - 2.0 * (1.0 - s) * (1.0 - d)
            }
        }),
        BlendMode::Darken => blend_in_place(dst, src, opacity, |s, d| s.min(d)),
        BlendMode::Lighten => blend_in_place(dst, src, opacity, |s, d| s.max(d)),
        BlendMode::Difference => blend_in_place(dst, src, opacity, |s, d| (d - s).abs()),
        BlendMode::Exclusion => blend_in_place(dst, src, opacity, |s, d| d + s - 2.0 * d * s),
    }
    Ok(())
}

/// Porter-Duff source-over for one premultiplied pixel.
pub(crate) fn over(dst: [u8; 4], src: [u8; 4], opacity: f32) -> [u8; 4] {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
}

fn destination_out_in_place(dst: &mut [u8], src: &[u8], opacity: f32) {
    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    if op == 0 {
        return;
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = mul_div255_u8(u16::from(s[3]), op);
        if sa == 0 {
            continue;
        }
        let keep = 255u16 - u16::from(sa);
        for c in d.iter_mut() {
            *c = mul_div255_u8(u16::from(*c), keep);
        }
    }
}

#[inline(always)]
fn blend_in_place<F>(dst: &mut [u8], src: &[u8], opacity: f32, blend_fn: F)
where
    F: Fn(f32, f32) -> f32,
{
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        // Separable blend on unpremultiplied colors, then source-over:
        // out_a = sa + da * (1 - sa)
        // out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
        let sa = (f32::from(s[3]) / 255.0) * opacity;
        if sa <= 0.0 {
            continue;
        }
        let da = f32::from(d[3]) / 255.0;
        let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);

        for c in 0..3 {
            let sp = (f32::from(s[c]) / 255.0) * opacity;
            let dp = f32::from(d[c]) / 255.0;
            let sc = (sp / sa).clamp(0.0, 1.0);
            let dc = if da > 0.0 { (dp / da).clamp(0.0, 1.0) } else { 0.0 };
            let b = blend_fn(sc, dc).clamp(0.0, 1.0);
            let out_p = (sp * (1.0 - da) + dp * (1.0 - sa) + b * sa * da).clamp(0.0, 1.0);
            d[c] = (out_p * 255.0).round() as u8;
        }
        d[3] = (out_a * 255.0).round() as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
