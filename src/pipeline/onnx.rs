//! ONNX Runtime seq2seq backend for the QA/QG model.
//!
//! Runs an optimum-exported encoder/decoder pair (t5-style, e.g.
//! `valhalla/t5-base-qa-qg-hl`) with greedy autoregressive decoding.
//!
//! # Model export (one-time setup)
//!
//! ```bash
//! pip install optimum[onnxruntime]
//! optimum-cli export onnx \
//!     --model "valhalla/t5-base-qa-qg-hl" \
//!     --task text2text-generation \
//!     qa_qg_onnx/
//! ```
//!
//! The directory (or HuggingFace repo) must contain `encoder_model.onnx`,
//! `decoder_model.onnx` and `tokenizer.json`.

#![cfg(feature = "onnx")]

use std::path::Path;
use std::sync::{Arc, Mutex};

use hf_hub::api::sync::Api;
use ndarray::{Array2, Array3};
use ort::{
    execution_providers::CPUExecutionProvider, session::builder::GraphOptimizationLevel,
    session::Session, value::Tensor,
};
use tokenizers::Tokenizer;

use super::Seq2SeqModel;
use crate::{Error, Result};

/// Configuration for the ONNX seq2seq model.
#[derive(Debug, Clone)]
pub struct OrtSeq2SeqConfig {
    /// Maximum input length in tokens; longer inputs are truncated.
    pub max_input_length: usize,
    /// Decoder start token id (pad token for t5).
    pub decoder_start_token_id: u32,
    /// End-of-sequence token id.
    pub eos_token_id: u32,
    /// ONNX graph optimization level (1-3).
    pub optimization_level: u8,
    /// Number of intra-op inference threads.
    pub num_threads: usize,
}

impl Default for OrtSeq2SeqConfig {
    fn default() -> Self {
        Self {
            max_input_length: 512,
            decoder_start_token_id: 0,
            eos_token_id: 1,
            optimization_level: 3,
            num_threads: 4,
        }
    }
}

/// ONNX-backed seq2seq model (encoder + greedy decoder).
pub struct OrtSeq2Seq {
    encoder: Mutex<Session>,
    decoder: Mutex<Session>,
    tokenizer: Arc<Tokenizer>,
    config: OrtSeq2SeqConfig,
    model_id: String,
}

impl OrtSeq2Seq {
    /// Load from a local directory containing the optimum export.
    pub fn from_path(model_path: &str, config: OrtSeq2SeqConfig) -> Result<Self> {
        let dir = Path::new(model_path);
        let encoder_path = dir.join("encoder_model.onnx");
        let decoder_path = dir.join("decoder_model.onnx");
        let tokenizer_path = dir.join("tokenizer.json");

        if !encoder_path.exists() {
            return Err(Error::retrieval(format!(
                "Encoder not found at {}. Export with: optimum-cli export onnx --model <model> --task text2text-generation {}",
                encoder_path.display(),
                model_path
            )));
        }

        Self::load(&encoder_path, &decoder_path, &tokenizer_path, config, model_path)
    }

    /// Load from a HuggingFace model id via the hub cache.
    pub fn from_pretrained(model_id: &str, config: OrtSeq2SeqConfig) -> Result<Self> {
        let api = Api::new().map_err(|e| Error::retrieval(format!("HuggingFace API: {e}")))?;
        let repo = api.model(model_id.to_string());

        let encoder_path = repo
            .get("encoder_model.onnx")
            .or_else(|_| repo.get("onnx/encoder_model.onnx"))
            .map_err(|e| Error::retrieval(format!("Encoder download: {e}")))?;
        let decoder_path = repo
            .get("decoder_model.onnx")
            .or_else(|_| repo.get("onnx/decoder_model.onnx"))
            .map_err(|e| Error::retrieval(format!("Decoder download: {e}")))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| Error::retrieval(format!("Tokenizer download: {e}")))?;

        Self::load(&encoder_path, &decoder_path, &tokenizer_path, config, model_id)
    }

    fn load(
        encoder_path: &Path,
        decoder_path: &Path,
        tokenizer_path: &Path,
        config: OrtSeq2SeqConfig,
        model_id: &str,
    ) -> Result<Self> {
        let encoder = Self::build_session(encoder_path, &config)?;
        let decoder = Self::build_session(decoder_path, &config)?;
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| Error::retrieval(format!("Tokenizer: {e}")))?;

        log::info!("[seq2seq] Loaded model from {model_id}");

        Ok(Self {
            encoder: Mutex::new(encoder),
            decoder: Mutex::new(decoder),
            tokenizer: Arc::new(tokenizer),
            config,
            model_id: model_id.to_string(),
        })
    }

    fn build_session(path: &Path, config: &OrtSeq2SeqConfig) -> Result<Session> {
        let opt_level = match config.optimization_level {
            1 => GraphOptimizationLevel::Level1,
            2 => GraphOptimizationLevel::Level2,
            _ => GraphOptimizationLevel::Level3,
        };

        Session::builder()
            .map_err(|e| Error::model_init(format!("Session builder: {e}")))?
            .with_optimization_level(opt_level)
            .map_err(|e| Error::model_init(format!("Optimization level: {e}")))?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .map_err(|e| Error::model_init(format!("Execution provider: {e}")))?
            .with_intra_threads(config.num_threads)
            .map_err(|e| Error::model_init(format!("Threads: {e}")))?
            .commit_from_file(path)
            .map_err(|e| Error::model_init(format!("Load {}: {e}", path.display())))
    }

    /// Model identifier (path or hub id).
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Run the encoder over one tokenized input.
    ///
    /// Returns the hidden states as `[1, seq_len, hidden]`.
    fn encode(&self, input_ids: &[u32]) -> Result<Array3<f32>> {
        let seq_len = input_ids.len();
        let ids: Vec<i64> = input_ids.iter().map(|&id| i64::from(id)).collect();
        let mask = vec![1i64; seq_len];

        let ids_array = Array2::from_shape_vec((1, seq_len), ids)
            .map_err(|e| Error::inference(format!("input_ids shape: {e}")))?;
        let mask_array = Array2::from_shape_vec((1, seq_len), mask)
            .map_err(|e| Error::inference(format!("attention_mask shape: {e}")))?;

        let ids_tensor = Tensor::from_array(ids_array)
            .map_err(|e| Error::inference(format!("input_ids tensor: {e}")))?;
        let mask_tensor = Tensor::from_array(mask_array)
            .map_err(|e| Error::inference(format!("attention_mask tensor: {e}")))?;

        let mut encoder = self
            .encoder
            .lock()
            .map_err(|e| Error::inference(format!("encoder lock: {e}")))?;
        let outputs = encoder
            .run(ort::inputs![
                "input_ids" => ids_tensor.into_dyn(),
                "attention_mask" => mask_tensor.into_dyn(),
            ])
            .map_err(|e| Error::inference(format!("encoder run: {e}")))?;

        let hidden = outputs
            .get("last_hidden_state")
            .ok_or_else(|| Error::inference("encoder output missing last_hidden_state"))?;
        let (shape, data) = hidden
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::inference(format!("hidden state extract: {e}")))?;
        if shape.len() != 3 || shape[0] != 1 {
            return Err(Error::inference(format!(
                "unexpected encoder output shape: {shape:?}"
            )));
        }

        Array3::from_shape_vec(
            (1, shape[1] as usize, shape[2] as usize),
            data.to_vec(),
        )
        .map_err(|e| Error::inference(format!("hidden state shape: {e}")))
    }

    /// Greedy decode one sequence against precomputed encoder states.
    fn greedy_decode(
        &self,
        encoder_hidden: &Array3<f32>,
        input_len: usize,
        max_new_tokens: usize,
    ) -> Result<Vec<u32>> {
        let mut generated: Vec<u32> = vec![self.config.decoder_start_token_id];

        for _ in 0..max_new_tokens {
            let dec_len = generated.len();
            let dec_ids: Vec<i64> = generated.iter().map(|&id| i64::from(id)).collect();
            let dec_array = Array2::from_shape_vec((1, dec_len), dec_ids)
                .map_err(|e| Error::inference(format!("decoder ids shape: {e}")))?;
            let enc_mask = Array2::from_shape_vec((1, input_len), vec![1i64; input_len])
                .map_err(|e| Error::inference(format!("encoder mask shape: {e}")))?;

            let dec_tensor = Tensor::from_array(dec_array)
                .map_err(|e| Error::inference(format!("decoder ids tensor: {e}")))?;
            let mask_tensor = Tensor::from_array(enc_mask)
                .map_err(|e| Error::inference(format!("encoder mask tensor: {e}")))?;
            let hidden_tensor = Tensor::from_array(encoder_hidden.clone())
                .map_err(|e| Error::inference(format!("hidden state tensor: {e}")))?;

            let mut decoder = self
                .decoder
                .lock()
                .map_err(|e| Error::inference(format!("decoder lock: {e}")))?;
            let outputs = decoder
                .run(ort::inputs![
                    "input_ids" => dec_tensor.into_dyn(),
                    "encoder_attention_mask" => mask_tensor.into_dyn(),
                    "encoder_hidden_states" => hidden_tensor.into_dyn(),
                ])
                .map_err(|e| Error::inference(format!("decoder run: {e}")))?;

            let logits = outputs
                .get("logits")
                .ok_or_else(|| Error::inference("decoder output missing logits"))?;
            let (shape, data) = logits
                .try_extract_tensor::<f32>()
                .map_err(|e| Error::inference(format!("logits extract: {e}")))?;
            if shape.len() != 3 {
                return Err(Error::inference(format!(
                    "unexpected logits shape: {shape:?}"
                )));
            }
            let vocab = shape[2] as usize;
            let last = &data[(dec_len - 1) * vocab..dec_len * vocab];

            let next = last
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(idx, _)| idx as u32)
                .ok_or_else(|| Error::inference("empty logits"))?;

            if next == self.config.eos_token_id {
                break;
            }
            generated.push(next);
        }

        // Drop the decoder start token.
        Ok(generated.split_off(1))
    }
}

impl Seq2SeqModel for OrtSeq2Seq {
    fn tokenize(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::tokenizer(format!("encode: {e}")))?;
        let mut ids = encoding.get_ids().to_vec();
        ids.truncate(self.config.max_input_length);
        Ok(ids)
    }

    /// Sequences in a batch are decoded one at a time; callers bound batch
    /// size via chunking, and output order matches input order.
    fn generate(&self, inputs: &[Vec<u32>], max_new_tokens: usize) -> Result<Vec<Vec<u32>>> {
        let mut outputs = Vec::with_capacity(inputs.len());
        for input in inputs {
            if input.is_empty() {
                return Err(Error::invalid_input("empty tokenized input"));
            }
            let hidden = self.encode(input)?;
            outputs.push(self.greedy_decode(&hidden, input.len(), max_new_tokens)?);
        }
        Ok(outputs)
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.tokenizer
            .decode(ids, true)
            .map(|s| s.trim().to_string())
            .map_err(|e| Error::tokenizer(format!("decode: {e}")))
    }

    fn name(&self) -> &'static str {
        "ort-seq2seq"
    }
}
