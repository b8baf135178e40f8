pub mod backtest_service;
pub mod chart_service;
pub mod quote_service;
