use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

pub struct EncodedBatch {
    pub input_ids: Tensor,
    pub attention_mask: Tensor,
    pub token_type_ids: Tensor,
}

/// Tokenize `texts`, truncate each to `max_len` tokens and right-pad the batch
/// to its longest member with `pad_id`.
pub fn tokenize_batch(tokenizer: &Tokenizer, texts: &[String], max_len: usize, pad_id: u32, device: &Device) -> Result<EncodedBatch> {
    let mut rows = Vec::with_capacity(texts.len());
    for text in texts {
        let enc = tokenizer.encode(text.as_str(), true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let mut ids = enc.get_ids().to_vec();
        ids.truncate(max_len);
        rows.push(ids);
    }
    let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);

    let mut ids_flat = Vec::with_capacity(rows.len() * width);
    let mut mask_flat = Vec::with_capacity(rows.len() * width);
    for ids in &rows {
        let pad = width - ids.len();
        ids_flat.extend_from_slice(ids);
        ids_flat.extend(std::iter::repeat(pad_id).take(pad));
        mask_flat.extend(std::iter::repeat(1u32).take(ids.len()));
        mask_flat.extend(std::iter::repeat(0u32).take(pad));
    }

    let input_ids = Tensor::from_vec(ids_flat, (rows.len(), width), device)?;
    let attention_mask = Tensor::from_vec(mask_flat, (rows.len(), width), device)?;
    let token_type_ids = input_ids.zeros_like()?;
    Ok(EncodedBatch { input_ids, attention_mask, token_type_ids })
}
