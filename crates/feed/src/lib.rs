//! 内置抽取器：CoinGecko、FRED、Alternative.me、Yahoo Finance。
//!
//! 每个抽取器可通过符号名 (`coingecko_extractor`) 或模块描述符
//! (`{module: sigflow_feed, class: CoinGeckoExtractor}`) 构造。

pub mod alternative;
pub mod coingecko;
pub mod fred;
mod http;
pub mod snapshot;
pub mod yahoo;

use sigflow_core::common::Params;
use sigflow_core::extract::port::Extractor;
use sigflow_core::plugin::error::PluginError;
use sigflow_core::plugin::port::{PluginFactory, PluginKind};

use crate::alternative::{FearGreedExtractor, GlobalMarketExtractor};
use crate::coingecko::CoinGeckoExtractor;
use crate::fred::FredExtractor;
use crate::snapshot::SnapshotExtractor;
use crate::yahoo::YahooExtractor;

/// 本 crate 注册的模块路径
pub const MODULE: &str = "sigflow_feed";

/// # Summary
/// 内置抽取器种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    CoinGecko,
    Fred,
    FearGreed,
    GlobalMarket,
    Yahoo,
}

impl FeedKind {
    pub const ALL: [FeedKind; 5] = [
        FeedKind::CoinGecko,
        FeedKind::Fred,
        FeedKind::FearGreed,
        FeedKind::GlobalMarket,
        FeedKind::Yahoo,
    ];

    /// 配置中使用的符号名
    pub fn name(&self) -> &'static str {
        match self {
            FeedKind::CoinGecko => "coingecko_extractor",
            FeedKind::Fred => "fred_extractor",
            FeedKind::FearGreed => "alternative_extractor",
            FeedKind::GlobalMarket => "alternative_global_extractor",
            FeedKind::Yahoo => "yahoo_extractor",
        }
    }

    /// 模块描述符中使用的类名
    pub fn class(&self) -> &'static str {
        match self {
            FeedKind::CoinGecko => "CoinGeckoExtractor",
            FeedKind::Fred => "FredExtractor",
            FeedKind::FearGreed => "FearGreedExtractor",
            FeedKind::GlobalMarket => "GlobalMarketExtractor",
            FeedKind::Yahoo => "YahooExtractor",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn from_class(class: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.class() == class)
    }

    /// # Summary
    /// 构造抽取器，参数含 `output_file` 时附加原始快照。
    pub fn build(&self, params: &Params) -> Result<Box<dyn Extractor>, PluginError> {
        let inner: Box<dyn Extractor> = match self {
            FeedKind::CoinGecko => Box::new(CoinGeckoExtractor::from_params(params)?),
            FeedKind::Fred => Box::new(FredExtractor::from_params(params)?),
            FeedKind::FearGreed => Box::new(FearGreedExtractor::from_params(params)?),
            FeedKind::GlobalMarket => Box::new(GlobalMarketExtractor::from_params(params)?),
            FeedKind::Yahoo => Box::new(YahooExtractor::from_params(params)?),
        };
        Ok(SnapshotExtractor::wrap(inner, params))
    }
}

/// # Summary
/// `sigflow_feed` 模块工厂。
#[derive(Debug, Default, Clone, Copy)]
pub struct FeedModule;

impl PluginFactory for FeedModule {
    fn module(&self) -> &str {
        MODULE
    }

    fn extractor(&self, class: &str, params: &Params) -> Result<Box<dyn Extractor>, PluginError> {
        FeedKind::from_class(class)
            .ok_or_else(|| self.unknown_class(PluginKind::Extractor, class))?
            .build(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_classes_roundtrip() {
        for kind in FeedKind::ALL {
            assert_eq!(FeedKind::from_name(kind.name()), Some(kind));
            assert_eq!(FeedKind::from_class(kind.class()), Some(kind));
        }
        assert_eq!(FeedKind::from_name("FredExtractor"), None);
    }

    #[test]
    fn test_module_rejects_unknown_class() {
        let err = FeedModule.extractor("NopeExtractor", &Params::new()).err();
        assert!(matches!(err, Some(PluginError::UnknownClass { .. })));
        let err = FeedModule.transformer("FredExtractor", &Params::new()).err();
        assert!(matches!(err, Some(PluginError::UnknownClass { .. })));
    }
}
