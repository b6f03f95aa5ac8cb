//! # Quant
//!
//! $$
//! (\mu, \Sigma) \mapsto \{(\sigma_k, \mu_k, S_k)\}_{k=1}^{N}
//! $$
//!
pub mod portfolio;
