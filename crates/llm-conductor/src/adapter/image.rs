// Image payload checks against a provider profile.

use llm_conductor_types::{Error, ImageData, ProviderConfiguration};

/// Image subtype from a data URL header, lowercased.
///
/// `data:image/png;base64` → `png`. A header without a `/` yields the whole media type.
pub fn data_url_format(header: &str) -> String {
    let media_type = header
        .strip_prefix("data:")
        .unwrap_or(header)
        .split(';')
        .next()
        .unwrap_or_default();
    let subtype = media_type
        .split_once('/')
        .map(|(_, sub)| sub)
        .unwrap_or(media_type);
    subtype.trim().to_ascii_lowercase()
}

/// Approximate decoded size of a base64 payload in bytes.
pub fn decoded_len(payload: &str) -> usize {
    payload.len() * 3 / 4
}

/// Validate one image against the profile's format and size limits.
///
/// Only `data:` URLs are inspected; remote URLs pass through unchanged.
pub fn validate_image(image: &ImageData, config: &ProviderConfiguration) -> Result<(), Error> {
    if !image.is_data_url() {
        return Ok(());
    }

    let parts: Vec<&str> = image.data.split(',').collect();
    let [header, payload] = parts.as_slice() else {
        return Err(Error::invalid_input(format!(
            "malformed image data URL: expected 2 comma-separated components, found {}",
            parts.len()
        )));
    };

    let format = data_url_format(header);
    if !config.supports_image_format(&format) {
        return Err(Error::invalid_input(format!(
            "unsupported image format '{format}' (supported: {})",
            config.supported_image_formats.join(", ")
        )));
    }

    if let Some(max) = config.max_image_size {
        let size = decoded_len(payload);
        if size > max {
            return Err(Error::invalid_input(format!(
                "image of {size} bytes exceeds the {max} byte limit"
            )));
        }
    }

    Ok(())
}
