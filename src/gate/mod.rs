//! 资源准入门 - 协调文章生成与配图生成对同一台推理服务器的争用
//!
//! 规则：
//! - 最多允许 `max_concurrent_articles` 篇文章同时生成（信号量约束）
//! - 配图任务必须等待所有文章生成退场后才能开始（屏障约束）
//! - 配图任务之间严格串行，互相之间永不重叠（串行锁约束）
//!
//! 门本身是显式构造、按句柄传递的对象，不是全局单例，便于在测试中独立创建多个门。

use anyhow::{Context, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, OwnedSemaphorePermit, Semaphore, watch};

/// 门的共享可变状态
///
/// 计数器由独立的互斥锁保护，与限制并发量的信号量分离。最后一篇文章的释放路径
/// 需要在持有计数器锁的同时翻转屏障，此时其他文章任务可能正在获取信号量，
/// 两种机制合用同一把锁会造成死锁。
struct GateState {
    /// 当前活跃的文章生成任务数
    active_articles: usize,
    /// 排队等待的配图任务数
    waiting_images: usize,
}

struct GateInner {
    state: Mutex<GateState>,
    /// 屏障信号：true表示没有任何文章生成在进行（quiesced）
    quiesced: watch::Sender<bool>,
}

impl GateInner {
    /// 计数器锁只保护两个整数，临界区极短；锁中毒仅在持锁线程panic时发生，
    /// 此处直接恢复内部数据继续使用
    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// 门的当前状态快照
#[derive(Debug, Clone)]
pub struct GateStatus {
    /// 活跃的文章生成任务数
    pub active_articles: usize,
    /// 排队等待的配图任务数
    pub waiting_images: usize,
    /// 剩余可用的文章生成名额（取自信号量）
    pub available_article_slots: usize,
    /// 配图串行锁是否被占用
    pub image_turn_busy: bool,
}

/// 资源准入门
pub struct ResourceGate {
    article_semaphore: Arc<Semaphore>,
    image_lock: Arc<AsyncMutex<()>>,
    inner: Arc<GateInner>,
    max_concurrent_articles: usize,
}

impl ResourceGate {
    /// 创建新的准入门
    ///
    /// `max_concurrent_articles` 为0时按1处理，容量约束至少保留一个名额。
    pub fn new(max_concurrent_articles: usize) -> Self {
        let capacity = max_concurrent_articles.max(1);
        // 初始状态没有文章在生成，屏障置为quiesced
        let (quiesced, _) = watch::channel(true);

        println!(
            "🚦 资源准入门已初始化 (max_concurrent_articles: {})",
            capacity
        );

        Self {
            article_semaphore: Arc::new(Semaphore::new(capacity)),
            image_lock: Arc::new(AsyncMutex::new(())),
            inner: Arc::new(GateInner {
                state: Mutex::new(GateState {
                    active_articles: 0,
                    waiting_images: 0,
                }),
                quiesced,
            }),
            max_concurrent_articles: capacity,
        }
    }

    /// 获取一个文章生成名额
    ///
    /// 活跃文章数达到上限时阻塞，直到有名额释放。返回的凭据在离开作用域时
    /// 自动归还名额，任何退出路径（包括panic导致的任务退出）都不会泄漏。
    pub async fn acquire_article(&self) -> Result<ArticleSlot> {
        let permit = self
            .article_semaphore
            .clone()
            .acquire_owned()
            .await
            .context("article semaphore closed")?;

        let active = {
            let mut state = self.inner.lock_state();
            state.active_articles += 1;
            if state.active_articles == 1 {
                // 第一篇文章入场，通知配图任务等待
                self.inner.quiesced.send_replace(false);
            }
            state.active_articles
        };

        println!(
            "📝 文章生成开始 (active: {}/{})",
            active, self.max_concurrent_articles
        );

        Ok(ArticleSlot {
            inner: Arc::clone(&self.inner),
            max_concurrent_articles: self.max_concurrent_articles,
            _permit: permit,
        })
    }

    /// 获取配图执行轮次
    ///
    /// 无条件等待屏障进入quiesced状态（没有文章在生成时立即返回），随后取得
    /// 配图串行锁，保证配图任务之间永不重叠。等待期间若有新的文章任务入场，
    /// 会继续等待而不会被错误唤醒。不保证等待中的配图任务之间的FIFO顺序。
    pub async fn acquire_image_turn(&self) -> Result<ImageTurn> {
        let (waiting, active) = {
            let mut state = self.inner.lock_state();
            state.waiting_images += 1;
            (state.waiting_images, state.active_articles)
        };
        println!(
            "🖼 配图任务排队 (waiting: {}, articles active: {})",
            waiting, active
        );

        if active > 0 {
            println!("⏳ 等待 {} 篇文章生成完成后再进行配图...", active);
        }

        let mut quiesced_rx = self.inner.quiesced.subscribe();
        let guard = loop {
            quiesced_rx
                .wait_for(|quiesced| *quiesced)
                .await
                .context("gate barrier channel closed")?;

            let guard = self.image_lock.clone().lock_owned().await;

            // 拿到串行锁后复核计数，等待锁的间隙可能有新的文章任务入场
            if self.inner.lock_state().active_articles == 0 {
                break guard;
            }
            drop(guard);
        };

        let waiting = {
            let mut state = self.inner.lock_state();
            state.waiting_images -= 1;
            state.waiting_images
        };
        println!("🎨 配图任务开始 (waiting: {})", waiting);

        Ok(ImageTurn { _guard: guard })
    }

    /// 获取门的状态快照
    pub fn status(&self) -> GateStatus {
        let state = self.inner.lock_state();
        GateStatus {
            active_articles: state.active_articles,
            waiting_images: state.waiting_images,
            available_article_slots: self.article_semaphore.available_permits(),
            image_turn_busy: self.image_lock.try_lock().is_err(),
        }
    }

    /// 配置的文章并发上限
    pub fn max_concurrent_articles(&self) -> usize {
        self.max_concurrent_articles
    }
}

/// 文章生成名额凭据
///
/// 存活期间占用一个并发名额；销毁时递减活跃计数，最后一篇文章退场时
/// 将屏障翻转为quiesced，唤醒等待中的配图任务。
pub struct ArticleSlot {
    inner: Arc<GateInner>,
    max_concurrent_articles: usize,
    _permit: OwnedSemaphorePermit,
}

impl Drop for ArticleSlot {
    fn drop(&mut self) {
        let mut state = self.inner.lock_state();
        state.active_articles -= 1;
        println!(
            "✓ 文章生成完成 (active: {}/{})",
            state.active_articles, self.max_concurrent_articles
        );

        if state.active_articles == 0 {
            self.inner.quiesced.send_replace(true);
            println!("✓ 所有文章生成已退场，配图任务可以进行");
        }
        // 信号量名额随 _permit 一起归还，发生在屏障翻转之后
    }
}

/// 配图执行轮次凭据
///
/// 存活期间独占配图串行锁；销毁时释放，下一个排队的配图任务得以进行。
pub struct ImageTurn {
    _guard: OwnedMutexGuard<()>,
}

impl Drop for ImageTurn {
    fn drop(&mut self) {
        println!("✓ 配图任务完成");
    }
}
