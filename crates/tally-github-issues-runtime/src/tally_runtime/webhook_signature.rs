use anyhow::{anyhow, bail, Context, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub(crate) const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Accept the payload when its signature matches any of the allowed secrets.
pub(crate) fn verify_webhook_signature(
    payload: &[u8],
    signature_header: &str,
    allowed_secrets: &[String],
) -> Result<()> {
    if allowed_secrets.is_empty() {
        return Ok(());
    }
    let signature_bytes = parse_signature_header(signature_header)?;
    for secret in allowed_secrets {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .context("failed to initialize hmac verifier")?;
        mac.update(payload);
        if mac.verify_slice(&signature_bytes).is_ok() {
            return Ok(());
        }
    }
    Err(anyhow!("signature verification failed"))
}

fn parse_signature_header(signature_header: &str) -> Result<Vec<u8>> {
    let digest_hex = signature_header
        .trim()
        .strip_prefix("sha256=")
        .ok_or_else(|| anyhow!("signature must use sha256=<hex> format"))?;
    decode_hex(digest_hex)
}

fn decode_hex(raw: &str) -> Result<Vec<u8>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("signature digest cannot be empty");
    }
    if trimmed.len() % 2 != 0 {
        bail!("signature digest must have an even number of hex characters");
    }
    let mut bytes = Vec::with_capacity(trimmed.len() / 2);
    let mut index = 0usize;
    while index < trimmed.len() {
        let next = index.saturating_add(2);
        let chunk = trimmed
            .get(index..next)
            .ok_or_else(|| anyhow!("signature digest must be ascii hex"))?;
        let byte = u8::from_str_radix(chunk, 16)
            .with_context(|| format!("invalid hex byte '{}' in signature digest", chunk))?;
        bytes.push(byte);
        index = next;
    }
    Ok(bytes)
}

#[cfg(test)]
pub(crate) fn sign_payload(payload: &[u8], secret: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("hmac");
    mac.update(payload);
    format!(
        "sha256={}",
        mac.finalize()
            .into_bytes()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<String>()
    )
}
