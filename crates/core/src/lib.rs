// Quotes Core - 核心数据模型
//!
//! 包含：
//! - Quote: 名言记录与草稿
//! - SearchCondition: 作者/内容子串过滤
//! - Page: 分页请求与结果
//! - StorageConfig: 存储后端配置

mod quote;
mod search;
mod page;
mod config;

pub use quote::*;
pub use search::*;
pub use page::*;
pub use config::*;
