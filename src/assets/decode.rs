use anyhow::Context as _;
use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::raster::Raster;

/// Decode an encoded image (PNG, JPEG, ...) into a premultiplied raster with pixels.
pub fn decode_image(bytes: &[u8]) -> CaptionResult<Raster> {
    let raster = Raster::decode(bytes)?;
    raster.validate()?;
    Ok(raster)
}

/// `data:<mime>;base64,<payload>` URL for `bytes`.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Split a base64 `data:` URL into its media type and decoded payload.
pub fn decode_data_url(url: &str) -> CaptionResult<(String, Vec<u8>)> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| CaptionError::validation("data url must start with 'data:'"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| CaptionError::validation("data url has no ',' separator"))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| CaptionError::validation("only base64 data urls are supported"))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .context("decode data url payload")?;
    Ok((mime.to_owned(), bytes))
}

/// PNG data URL of a raster.
pub fn raster_to_png_data_url(raster: &Raster) -> CaptionResult<String> {
    Ok(encode_data_url("image/png", &raster.encode_png()?))
}

/// Raster from an image data URL of any decodable format.
pub fn raster_from_data_url(url: &str) -> CaptionResult<Raster> {
    let (mime, bytes) = decode_data_url(url)?;
    if !mime.is_empty() && !mime.starts_with("image/") {
        return Err(CaptionError::validation(format!(
            "data url media type '{mime}' is not an image"
        )));
    }
    decode_image(&bytes)
}

/// Serde adapter storing an optional raster as a PNG data URL string.
pub(crate) mod png_data_url {
    use std::sync::Arc;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::render::raster::Raster;

    pub(crate) fn serialize<S: Serializer>(
        value: &Option<Arc<Raster>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(raster) => {
                let url =
                    super::raster_to_png_data_url(raster).map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&url)
            }
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Arc<Raster>>, D::Error> {
        let Some(url) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        super::raster_from_data_url(&url)
            .map(|r| Some(Arc::new(r)))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
