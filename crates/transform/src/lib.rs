//! 内置转换器：把各数据源的原始记录映射为 `NormalizedMetric`。

pub mod alternative;
pub mod coin;
pub mod fred;
pub mod key;
mod value;
pub mod yahoo;

use sigflow_core::common::time::{RealTimeProvider, TimeProvider};
use sigflow_core::common::{Params, ParamsExt};
use sigflow_core::plugin::error::PluginError;
use sigflow_core::plugin::port::{PluginFactory, PluginKind};
use sigflow_core::transform::port::Transformer;
use std::sync::Arc;

use crate::alternative::{FearGreedTransformer, TotalMarketCapTransformer};
use crate::coin::CoinFieldTransformer;
use crate::fred::M2Transformer;
use crate::key::KeyTransformer;
use crate::yahoo::YahooCloseTransformer;

/// 本 crate 注册的模块路径
pub const MODULE: &str = "sigflow_transform";

/// # Summary
/// 内置转换器种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    BitcoinPrice,
    BitcoinMarketCap,
    Bitcoin24hChange,
    Bitcoin24hVolume,
    Key,
    M2,
    FearGreed,
    TotalMarketCap,
    YahooClose,
}

impl TransformKind {
    pub const ALL: [TransformKind; 9] = [
        TransformKind::BitcoinPrice,
        TransformKind::BitcoinMarketCap,
        TransformKind::Bitcoin24hChange,
        TransformKind::Bitcoin24hVolume,
        TransformKind::Key,
        TransformKind::M2,
        TransformKind::FearGreed,
        TransformKind::TotalMarketCap,
        TransformKind::YahooClose,
    ];

    /// 配置中使用的符号名
    pub fn name(&self) -> &'static str {
        match self {
            TransformKind::BitcoinPrice => "bitcoin_price_transformer",
            TransformKind::BitcoinMarketCap => "bitcoin_market_cap_transformer",
            TransformKind::Bitcoin24hChange => "bitcoin_24h_change_transformer",
            TransformKind::Bitcoin24hVolume => "bitcoin_24h_volume_transformer",
            TransformKind::Key => "key_transformer",
            TransformKind::M2 => "m2_transformer",
            TransformKind::FearGreed => "fear_greed_transformer",
            TransformKind::TotalMarketCap => "total_market_cap_transformer",
            TransformKind::YahooClose => "yahoo_close_transformer",
        }
    }

    /// 模块描述符中使用的类名
    pub fn class(&self) -> &'static str {
        match self {
            TransformKind::BitcoinPrice => "BitcoinPriceTransformer",
            TransformKind::BitcoinMarketCap => "BitcoinMarketCapTransformer",
            TransformKind::Bitcoin24hChange => "Bitcoin24hChangeTransformer",
            TransformKind::Bitcoin24hVolume => "Bitcoin24hVolumeTransformer",
            TransformKind::Key => "KeyTransformer",
            TransformKind::M2 => "M2Transformer",
            TransformKind::FearGreed => "FearGreedTransformer",
            TransformKind::TotalMarketCap => "TotalMarketCapTransformer",
            TransformKind::YahooClose => "YahooCloseTransformer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn from_class(class: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.class() == class)
    }

    /// 使用系统时钟构造
    pub fn build(&self, params: &Params) -> Result<Box<dyn Transformer>, PluginError> {
        self.build_with_clock(params, Arc::new(RealTimeProvider))
    }

    /// # Summary
    /// 使用指定时钟构造转换器。
    ///
    /// # Arguments
    /// * `params`: 转换器参数；CoinGecko 系列接受 `coin_id` (默认 bitcoin)。
    /// * `clock`: 源数据缺少时间戳时用来取得今天的时钟。
    pub fn build_with_clock(
        &self,
        params: &Params,
        clock: Arc<dyn TimeProvider>,
    ) -> Result<Box<dyn Transformer>, PluginError> {
        let coin_id = params.str_or("coin_id", "bitcoin");
        Ok(match self {
            TransformKind::BitcoinPrice => Box::new(CoinFieldTransformer::price(coin_id, clock)),
            TransformKind::BitcoinMarketCap => {
                Box::new(CoinFieldTransformer::market_cap(coin_id, clock))
            }
            TransformKind::Bitcoin24hChange => {
                Box::new(CoinFieldTransformer::change_24h(coin_id, clock))
            }
            TransformKind::Bitcoin24hVolume => {
                Box::new(CoinFieldTransformer::volume_24h(coin_id, clock))
            }
            TransformKind::Key => Box::new(KeyTransformer::from_params(params, clock)?),
            TransformKind::M2 => Box::new(M2Transformer::new(clock)),
            TransformKind::FearGreed => Box::new(FearGreedTransformer::new(clock)),
            TransformKind::TotalMarketCap => Box::new(TotalMarketCapTransformer::new(clock)),
            TransformKind::YahooClose => Box::new(YahooCloseTransformer::from_params(params)),
        })
    }
}

/// # Summary
/// `sigflow_transform` 模块工厂。
#[derive(Debug, Default, Clone, Copy)]
pub struct TransformModule;

impl PluginFactory for TransformModule {
    fn module(&self) -> &str {
        MODULE
    }

    fn transformer(
        &self,
        class: &str,
        params: &Params,
    ) -> Result<Box<dyn Transformer>, PluginError> {
        TransformKind::from_class(class)
            .ok_or_else(|| self.unknown_class(PluginKind::Transformer, class))?
            .build(params)
    }
}
