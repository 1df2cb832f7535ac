// ==========================================
// 集成测试辅助模块
// ==========================================
// 各测试二进制只使用部分构建器方法
#![allow(dead_code)]

pub mod test_data_builder;
