//! 工具函数模块
//!
//! - 对象键计算与路径处理工具

pub mod path;
