pub mod histogram_chart;
pub mod summary_bar;
