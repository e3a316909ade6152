//! 生產周期推算

use chrono::NaiveDate;
use mrp_core::WorkCalendar;

/// 生產周期計算器
pub struct LeadTimeCalculator;

impl LeadTimeCalculator {
    /// 計算子件最晚完成日期（自父件需求日向後推算生產周期）
    pub fn calculate_child_required_date(
        parent_required_date: NaiveDate,
        lead_time_days: u32,
        calendar: &WorkCalendar,
    ) -> mrp_core::Result<NaiveDate> {
        calendar.subtract_working_days(parent_required_date, lead_time_days)
    }
}
