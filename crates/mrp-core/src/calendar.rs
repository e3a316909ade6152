//! 工作日曆模型

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{MrpError, Result};

/// 工作日曆
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkCalendar {
    /// 工作日（週一到週日，true表示工作日）
    /// 索引 0 = 週一, 1 = 週二, ..., 6 = 週日
    pub working_days: [bool; 7],

    /// 節假日列表
    pub holidays: Vec<NaiveDate>,

    /// 日曆ID
    pub calendar_id: String,
}

impl WorkCalendar {
    /// 創建新的工作日曆（預設週一到週五為工作日）
    pub fn new(calendar_id: String) -> Self {
        Self {
            working_days: [true, true, true, true, true, false, false], // 週一到週五
            calendar_id,
            holidays: Vec::new(),
        }
    }

    /// 創建 24/7 日曆（所有日子都是工作日）
    pub fn new_24_7(calendar_id: String) -> Self {
        Self {
            working_days: [true; 7],
            calendar_id,
            holidays: Vec::new(),
        }
    }

    /// 建構器模式：設置工作日
    pub fn with_working_days(mut self, working_days: [bool; 7]) -> Self {
        self.working_days = working_days;
        self
    }

    /// 建構器模式：設置節假日
    pub fn with_holidays(mut self, mut holidays: Vec<NaiveDate>) -> Self {
        holidays.sort();
        holidays.dedup();
        self.holidays = holidays;
        self
    }

    /// 添加節假日
    pub fn add_holiday(&mut self, date: NaiveDate) {
        if !self.holidays.contains(&date) {
            self.holidays.push(date);
            self.holidays.sort();
        }
    }

    /// 檢查日曆設定
    ///
    /// 一週內至少要有一個工作日，否則推算工作日的迴圈不會結束。
    pub fn validate(&self) -> Result<()> {
        if !self.working_days.iter().any(|&d| d) {
            return Err(MrpError::InvalidCalendar(format!(
                "日曆 {} 沒有任何工作日",
                self.calendar_id
            )));
        }
        Ok(())
    }

    /// 檢查是否為工作日
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        // 檢查是否為節假日
        if self.holidays.contains(&date) {
            return false;
        }

        let weekday_index = date.weekday().num_days_from_monday() as usize;
        self.working_days[weekday_index]
    }

    /// 計算工作日（向前推算）
    ///
    /// 從 `start_date` 的下一天開始逐日前進，跨過 `days` 個工作日後停止。
    /// `days == 0` 時直接返回 `start_date`。
    pub fn add_working_days(&self, start_date: NaiveDate, days: u32) -> Result<NaiveDate> {
        if days > 0 {
            self.validate()?;
        }

        let mut current = start_date;
        let mut remaining = days;

        while remaining > 0 {
            current = current
                .succ_opt()
                .ok_or_else(|| MrpError::InvalidDate(format!("日期溢出: {}", current)))?;
            if self.is_working_day(current) {
                remaining -= 1;
            }
        }

        Ok(current)
    }

    /// 計算工作日（向後推算）
    pub fn subtract_working_days(&self, start_date: NaiveDate, days: u32) -> Result<NaiveDate> {
        if days > 0 {
            self.validate()?;
        }

        let mut current = start_date;
        let mut remaining = days;

        while remaining > 0 {
            current = current
                .pred_opt()
                .ok_or_else(|| MrpError::InvalidDate(format!("日期溢出: {}", current)))?;
            if self.is_working_day(current) {
                remaining -= 1;
            }
        }

        Ok(current)
    }

    /// 計算 `[start, end]` 區間內（含首尾）的工作日數量
    ///
    /// `start > end` 時返回 0。
    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_working_day(*d))
            .count() as u32
    }
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self::new("DEFAULT".to_string())
    }
}
