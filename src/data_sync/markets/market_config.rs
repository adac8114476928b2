use crate::logic::pools::Fee;
use crate::logic::types::EvaluatorConfig;
use crate::utils::config_loader::{ArbConfigLoader, ArbConfigLoaderSync, LoadConfigError, load_from_file, load_from_file_sync};
use alloy_primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    pub address: Address,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub decimals: Option<u8>,
}

/// One constant-product pool. `fee` applies to both directions unless `fee0`/`fee1` override it.
#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    pub address: Address,
    pub name: Option<String>,
    pub token0: Address,
    pub token1: Address,
    pub fee: Option<Fee>,
    pub fee0: Option<Fee>,
    pub fee1: Option<Fee>,
}

impl PoolConfig {
    pub fn fees(&self) -> (Fee, Fee) {
        let fee = self.fee.unwrap_or_default();
        (self.fee0.unwrap_or(fee), self.fee1.unwrap_or(fee))
    }
}

/// Borrow `borrow_token` from `borrow_pool` and route it through `pools`.
/// `tokens` lists the route including both ends, one more entry than `pools`.
#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StrategyConfig {
    pub name: String,
    pub borrow_pool: Address,
    pub borrow_token: Address,
    pub tokens: Vec<Address>,
    pub pools: Vec<Address>,
}

#[derive(Clone, Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MarketConfigSection {
    #[serde(default)]
    pub optimizer: EvaluatorConfig,
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
    #[serde(default)]
    pub strategies: Vec<StrategyConfig>,
}

#[async_trait]
impl ArbConfigLoader for MarketConfigSection {
    type SectionType = MarketConfigSection;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        load_from_file(file_name).await
    }
}

impl ArbConfigLoaderSync for MarketConfigSection {
    type SectionType = MarketConfigSection;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        load_from_file_sync(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config_loader::load_from_str;

    const CONFIG: &str = r#"
[optimizer]
max_iterations = 120

[[tokens]]
address = "0x0101010101010101010101010101010101010101"
symbol = "WBNB"
decimals = 18

[[pools]]
address = "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a"
token0 = "0x0101010101010101010101010101010101010101"
token1 = "0x0202020202020202020202020202020202020202"
fee = 0.0025
fee1 = 0.003

[[strategies]]
name = "borrow-wbnb"
borrow_pool = "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a"
borrow_token = "0x0101010101010101010101010101010101010101"
tokens = ["0x0101010101010101010101010101010101010101", "0x0202020202020202020202020202020202020202"]
pools = ["0x0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b"]
"#;

    #[test]
    fn test_parse_sections() -> eyre::Result<()> {
        let config: MarketConfigSection = load_from_str(CONFIG)?;

        assert_eq!(config.optimizer.max_iterations, 120);
        assert_eq!(config.optimizer.tolerance, EvaluatorConfig::default().tolerance);
        assert_eq!(config.tokens[0].symbol.as_deref(), Some("WBNB"));
        assert_eq!(config.tokens[0].name, None);
        assert_eq!(config.strategies[0].tokens.len(), 2);

        let (fee0, fee1) = config.pools[0].fees();
        assert_eq!(fee0.as_f64(), 0.0025);
        assert_eq!(fee1.as_f64(), 0.003);
        Ok(())
    }

    #[test]
    fn test_empty_config() -> eyre::Result<()> {
        let config: MarketConfigSection = load_from_str("")?;
        assert_eq!(config, MarketConfigSection::default());
        Ok(())
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<MarketConfigSection, _> = load_from_str("[[tokens]]\naddress = \"0x0101010101010101010101010101010101010101\"\ncolor = \"red\"\n");
        assert!(matches!(result, Err(LoadConfigError::TomlError(_))));
    }

    #[test]
    fn test_invalid_fee_rejected() {
        let result: Result<MarketConfigSection, _> = load_from_str(
            "[[pools]]\naddress = \"0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a\"\ntoken0 = \"0x0101010101010101010101010101010101010101\"\ntoken1 = \"0x0202020202020202020202020202020202020202\"\nfee = 1.5\n",
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() -> eyre::Result<()> {
        let path = std::env::temp_dir().join("flash_arb_market_config_test.toml");
        tokio::fs::write(&path, CONFIG).await?;

        let config = MarketConfigSection::load_section_from_file(path.to_string_lossy().to_string()).await?;
        let config_sync = MarketConfigSection::load_section_from_file_sync(path.to_string_lossy().to_string())?;
        assert_eq!(config, config_sync);
        assert_eq!(config.pools.len(), 1);

        tokio::fs::remove_file(&path).await?;
        Ok(())
    }
}
