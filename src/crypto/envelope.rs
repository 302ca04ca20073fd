//! Cipher envelope
//!
//! ```text
//! CBC/b64:<iv>:<ciphertext>
//! CTR/hex:<nonce>:<ciphertext>
//! GCM/b64:<nonce>:<ciphertext>:<tag>
//! ```
//!
//! The header names the mode and the component encoding. Envelopes without the
//! encoding suffix (`CBC:...`) and the bare two-part `iv:ciphertext` form are
//! still accepted; their components are decoded as base64 when every one of
//! them is valid base64, and as hex otherwise.

use super::{AesMode, OutputFormat};
use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine};

/// Component encoding recorded in the envelope header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Header carried an explicit `/b64` or `/hex` suffix
    Tagged(OutputFormat),
    /// No suffix; components were decoded by trial
    Untagged,
}

/// Parsed AES envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub mode: AesMode,
    pub encoding: Encoding,
    /// IV (CBC) or nonce (CTR, GCM)
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    /// Authentication tag (GCM only)
    pub tag: Option<Vec<u8>>,
}

impl Envelope {
    /// Render with an explicit encoding tag
    pub fn render(&self, format: OutputFormat) -> String {
        let mut out = format!("{}/{}", self.mode.tag(), format_tag(format));
        out.push(':');
        out.push_str(&encode(&self.iv, format));
        out.push(':');
        out.push_str(&encode(&self.ciphertext, format));
        if let Some(tag) = &self.tag {
            out.push(':');
            out.push_str(&encode(tag, format));
        }
        out
    }

    /// Parse any accepted envelope form
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let header = parts[0];

        if let Some((mode, format)) = header.split_once('/') {
            let mode = AesMode::from_tag(mode).ok_or_else(|| {
                Error::InvalidFormat(format!("Unknown cipher mode '{}'", mode))
            })?;
            let format = parse_format_tag(format)?;
            check_parts(mode, parts.len())?;

            let components = parts[1..]
                .iter()
                .map(|p| decode(p, format))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Self::from_components(
                mode,
                Encoding::Tagged(format),
                components,
            ));
        }

        if let Some(mode) = AesMode::from_tag(header) {
            check_parts(mode, parts.len())?;
            let components = decode_by_trial(&parts[1..])?;
            return Ok(Self::from_components(mode, Encoding::Untagged, components));
        }

        if parts.len() == 2 {
            let components = decode_by_trial(&parts)?;
            return Ok(Self::from_components(
                AesMode::Cbc,
                Encoding::Untagged,
                components,
            ));
        }

        Err(Error::InvalidFormat(
            "Unknown ciphertext format (expected MODE:...:... or iv:ciphertext)".to_string(),
        ))
    }

    fn from_components(mode: AesMode, encoding: Encoding, components: Vec<Vec<u8>>) -> Self {
        let mut components = components.into_iter();
        let iv = components.next().unwrap_or_default();
        let ciphertext = components.next().unwrap_or_default();
        let tag = components.next();
        Envelope {
            mode,
            encoding,
            iv,
            ciphertext,
            tag,
        }
    }
}

fn check_parts(mode: AesMode, found: usize) -> Result<()> {
    if found == mode.envelope_parts() {
        Ok(())
    } else {
        Err(Error::InvalidFormat(format!(
            "Invalid {} ciphertext format: expected {} components, found {}",
            mode,
            mode.envelope_parts() - 1,
            found.saturating_sub(1)
        )))
    }
}

fn format_tag(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Base64 => "b64",
        OutputFormat::Hex => "hex",
    }
}

fn parse_format_tag(tag: &str) -> Result<OutputFormat> {
    match tag {
        "b64" => Ok(OutputFormat::Base64),
        "hex" => Ok(OutputFormat::Hex),
        other => Err(Error::InvalidFormat(format!(
            "Unknown envelope encoding '{}'",
            other
        ))),
    }
}

fn encode(bytes: &[u8], format: OutputFormat) -> String {
    match format {
        OutputFormat::Base64 => STANDARD.encode(bytes),
        OutputFormat::Hex => hex::encode(bytes),
    }
}

fn decode(component: &str, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Base64 => STANDARD
            .decode(component)
            .map_err(|e| Error::InvalidFormat(format!("Invalid base64 component: {}", e))),
        OutputFormat::Hex => hex::decode(component)
            .map_err(|e| Error::InvalidFormat(format!("Invalid hex component: {}", e))),
    }
}

/// Base64 for all components if that works, hex for all otherwise
fn decode_by_trial(components: &[&str]) -> Result<Vec<Vec<u8>>> {
    let base64: std::result::Result<Vec<_>, _> =
        components.iter().map(|c| STANDARD.decode(c)).collect();
    if let Ok(decoded) = base64 {
        return Ok(decoded);
    }

    components
        .iter()
        .map(|c| decode(c, OutputFormat::Hex))
        .collect::<Result<Vec<_>>>()
        .map_err(|_| {
            Error::InvalidFormat("Envelope components are neither base64 nor hex".to_string())
        })
}
