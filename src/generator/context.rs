use std::sync::Arc;

use anyhow::Result;

use crate::{
    config::Config,
    gate::ResourceGate,
    llm::LLMClient,
    media::{backend::ImageBackendClient, safety::SafetyClient, storage::StorageClient},
};

#[derive(Clone)]
pub struct GeneratorContext {
    /// LLM调用器，用于与AI通信。
    pub llm_client: LLMClient,
    /// 配置
    pub config: Config,
    /// 资源准入门
    pub gate: Arc<ResourceGate>,
    /// 图片生成后端
    pub image_backend: Arc<ImageBackendClient>,
    /// 内容安全服务
    pub safety: Arc<SafetyClient>,
    /// 持久化存储
    pub storage: Arc<StorageClient>,
}

impl GeneratorContext {
    /// 创建新的生成器上下文
    pub fn new(config: Config) -> Result<Self> {
        let llm_client = LLMClient::new(config.clone())?;
        let gate = Arc::new(ResourceGate::new(config.gate.max_concurrent_articles));
        let image_backend = Arc::new(ImageBackendClient::new(config.image.clone())?);
        let safety = Arc::new(SafetyClient::new(&config.safety)?);
        let storage = Arc::new(StorageClient::new(config.storage.clone())?);

        Ok(Self {
            llm_client,
            config,
            gate,
            image_backend,
            safety,
            storage,
        })
    }
}
