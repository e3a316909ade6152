//! 訂單交付能力分析
//!
//! 對每張訂單取其 BOM 子樹中最晚完成的物料作為關鍵路徑，
//! 以此推算訂單完成日期、延期天數與預警等級。

use chrono::NaiveDate;
use mrp_calc::BomGraph;
use mrp_core::{AlertLevel, CustomerOrder, DeliveryVerdict, PlanningConfig, ScheduleResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 關鍵路徑查找結果
#[derive(Debug, Clone, PartialEq, Eq)]
enum CriticalPath {
    /// 最晚完成的物料與其完成日期
    Finish { material: String, date: NaiveDate },
    /// 子樹中沒有任何物料有完成日期
    Unschedulable,
}

/// 交付能力分析器
pub struct DeliveryAnalyzer<'a> {
    bom_graph: &'a BomGraph,

    /// 物料編碼 → 排產結果
    schedules: HashMap<&'a str, &'a ScheduleResult>,

    config: &'a PlanningConfig,
}

impl<'a> DeliveryAnalyzer<'a> {
    pub fn new(
        bom_graph: &'a BomGraph,
        schedules: &'a [ScheduleResult],
        config: &'a PlanningConfig,
    ) -> Self {
        let schedules = schedules
            .iter()
            .map(|s| (s.material_code.as_str(), s))
            .collect();
        Self {
            bom_graph,
            schedules,
            config,
        }
    }

    /// 分析所有訂單（按輸入順序）
    pub fn analyze(&self, orders: &[CustomerOrder]) -> Vec<DeliveryVerdict> {
        tracing::info!("開始分析交付能力，訂單 {} 筆", orders.len());

        let verdicts: Vec<_> = orders.iter().map(|o| self.analyze_order(o)).collect();

        tracing::info!(
            "完成交付能力分析，延期訂單 {} 筆",
            verdicts.iter().filter(|v| v.is_late()).count()
        );
        verdicts
    }

    /// 分析單張訂單
    pub fn analyze_order(&self, order: &CustomerOrder) -> DeliveryVerdict {
        let materials = self.bom_graph.subtree_materials(&order.product_code);

        let mut verdict = DeliveryVerdict {
            order_id: order.order_id.clone(),
            product_code: order.product_code.clone(),
            due_date: order.due_date,
            estimated_finish_date: None,
            can_deliver: false,
            delay_days: self.config.unschedulable_delay_days,
            bottleneck_material: None,
            alert_level: AlertLevel::Unschedulable,
            involved_material_count: materials.len(),
        };

        if materials.is_empty() {
            tracing::warn!(
                "訂單 {} 的產品 {} 沒有 BOM 子件，標記為無法排產",
                order.order_id,
                order.product_code
            );
            return verdict;
        }

        match self.find_critical_path(&materials) {
            CriticalPath::Unschedulable => {
                tracing::warn!(
                    "訂單 {} 無法排產，子樹 {} 種物料均缺少產能資料",
                    order.order_id,
                    materials.len()
                );
            }
            CriticalPath::Finish { material, date } => {
                verdict.estimated_finish_date = Some(date);
                verdict.bottleneck_material = Some(material);
                verdict.can_deliver = date <= order.due_date;
                if verdict.can_deliver {
                    verdict.delay_days = 0;
                    verdict.alert_level = AlertLevel::Normal;
                } else {
                    verdict.delay_days = (date - order.due_date).num_days();
                    verdict.alert_level = self.alert_level(verdict.delay_days);
                }
            }
        }

        tracing::debug!(
            "訂單 {}：預計完成 {:?}，延期 {} 天，瓶頸 {:?}",
            verdict.order_id,
            verdict.estimated_finish_date,
            verdict.delay_days,
            verdict.bottleneck_material
        );

        verdict
    }

    /// 依延期天數判定預警等級
    pub fn alert_level(&self, delay_days: i64) -> AlertLevel {
        if delay_days >= self.config.red_threshold_days {
            AlertLevel::Red
        } else if delay_days >= self.config.yellow_threshold_days {
            AlertLevel::Yellow
        } else {
            AlertLevel::Normal
        }
    }

    /// 找出關鍵路徑
    ///
    /// 只考慮有完成日期的物料，按子樹遍歷順序取最晚者；
    /// 完成日期相同時保留先出現的物料。
    fn find_critical_path(&self, materials: &[String]) -> CriticalPath {
        let mut latest: Option<(&str, NaiveDate)> = None;

        for material in materials {
            let Some(finish) = self
                .schedules
                .get(material.as_str())
                .and_then(|s| s.estimated_finish_date)
            else {
                continue;
            };
            if latest.map_or(true, |(_, date)| finish > date) {
                latest = Some((material.as_str(), finish));
            }
        }

        match latest {
            Some((material, date)) => CriticalPath::Finish {
                material: material.to_string(),
                date,
            },
            None => CriticalPath::Unschedulable,
        }
    }
}

/// 交付彙總統計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliverySummary {
    pub order_count: usize,
    pub on_time_count: usize,
    pub delayed_count: usize,

    /// 按時交付率（%）
    pub on_time_rate_pct: Decimal,

    pub red_count: usize,
    pub yellow_count: usize,
    pub unschedulable_count: usize,

    /// 延期訂單的延期天數合計
    pub total_delay_days: i64,
}

impl DeliverySummary {
    pub fn from_verdicts(verdicts: &[DeliveryVerdict]) -> Self {
        let order_count = verdicts.len();
        let on_time_count = verdicts.iter().filter(|v| v.can_deliver).count();
        let count_level = |level: AlertLevel| {
            verdicts
                .iter()
                .filter(|v| v.alert_level == level)
                .count()
        };

        Self {
            order_count,
            on_time_count,
            delayed_count: order_count - on_time_count,
            on_time_rate_pct: if order_count == 0 {
                Decimal::ZERO
            } else {
                (Decimal::from(on_time_count) / Decimal::from(order_count)
                    * Decimal::ONE_HUNDRED)
                    .round_dp(2)
            },
            red_count: count_level(AlertLevel::Red),
            yellow_count: count_level(AlertLevel::Yellow),
            unschedulable_count: count_level(AlertLevel::Unschedulable),
            total_delay_days: verdicts
                .iter()
                .filter(|v| v.is_late())
                .map(|v| v.delay_days)
                .sum(),
        }
    }
}

/// 延期訂單：按延期天數由大到小，天數相同時保留輸入順序
pub fn delayed_orders(verdicts: &[DeliveryVerdict]) -> Vec<&DeliveryVerdict> {
    let mut delayed: Vec<_> = verdicts.iter().filter(|v| v.is_late()).collect();
    delayed.sort_by(|a, b| b.delay_days.cmp(&a.delay_days));
    delayed
}

/// 預警清單
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAlerts {
    pub red: Vec<DeliveryVerdict>,
    pub yellow: Vec<DeliveryVerdict>,
}

impl DeliveryAlerts {
    pub fn from_verdicts(verdicts: &[DeliveryVerdict]) -> Self {
        let pick = |level: AlertLevel| {
            verdicts
                .iter()
                .filter(|v| v.alert_level == level)
                .cloned()
                .collect::<Vec<_>>()
        };
        Self {
            red: pick(AlertLevel::Red),
            yellow: pick(AlertLevel::Yellow),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.red.is_empty() && self.yellow.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrp_core::{BomEdge, ScheduleStatus};
    use rstest::rstest;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn schedule(code: &str, finish: Option<NaiveDate>) -> ScheduleResult {
        match finish {
            Some(finish) => ScheduleResult {
                material_code: code.to_string(),
                total_requirement: Decimal::from(10),
                daily_capacity: 10,
                schedule_start_date: date(11, 3),
                estimated_finish_date: Some(finish),
                required_date: finish,
                is_delayed: false,
                delay_days: 0,
                production_days: 1,
                avg_utilization: Decimal::ONE,
                status: ScheduleStatus::Normal,
                daily_detail: Vec::new(),
            },
            None => ScheduleResult::no_capacity(
                code.to_string(),
                Decimal::from(10),
                date(11, 3),
                date(11, 10),
                9999,
            ),
        }
    }

    fn bike_graph() -> BomGraph {
        BomGraph::from_edges(vec![
            BomEdge::new("BIKE", "FRAME", Decimal::ONE, 1, 5),
            BomEdge::new("BIKE", "WHEEL", Decimal::from(2), 1, 3),
            BomEdge::new("WHEEL", "SPOKE", Decimal::from(36), 2, 1),
        ])
    }

    fn order(id: &str, product: &str, due: NaiveDate) -> CustomerOrder {
        CustomerOrder::new(
            id.to_string(),
            product.to_string(),
            Decimal::from(10),
            date(11, 3),
            due,
        )
    }

    #[test]
    fn test_latest_finish_is_critical_path() {
        let graph = bike_graph();
        let schedules = vec![
            schedule("FRAME", Some(date(11, 12))),
            schedule("WHEEL", Some(date(11, 10))),
            schedule("SPOKE", Some(date(11, 14))),
        ];
        let config = PlanningConfig::default();
        let analyzer = DeliveryAnalyzer::new(&graph, &schedules, &config);

        let verdict = analyzer.analyze_order(&order("SO-1", "BIKE", date(11, 20)));
        assert_eq!(verdict.bottleneck_material.as_deref(), Some("SPOKE"));
        assert_eq!(verdict.estimated_finish_date, Some(date(11, 14)));
        assert!(verdict.can_deliver);
        assert_eq!(verdict.delay_days, 0);
        assert_eq!(verdict.alert_level, AlertLevel::Normal);
        assert_eq!(verdict.involved_material_count, 3);
    }

    #[test]
    fn test_tie_keeps_first_seen_material() {
        let graph = bike_graph();
        let schedules = vec![
            schedule("SPOKE", Some(date(11, 12))),
            schedule("WHEEL", Some(date(11, 12))),
            schedule("FRAME", Some(date(11, 12))),
        ];
        let config = PlanningConfig::default();
        let analyzer = DeliveryAnalyzer::new(&graph, &schedules, &config);

        let verdict = analyzer.analyze_order(&order("SO-1", "BIKE", date(11, 20)));
        assert_eq!(verdict.bottleneck_material.as_deref(), Some("FRAME"));
    }

    #[rstest]
    #[case(date(11, 17), 1, AlertLevel::Yellow)]
    #[case(date(11, 12), 6, AlertLevel::Yellow)]
    #[case(date(11, 11), 7, AlertLevel::Red)]
    fn test_alert_levels(
        #[case] due: NaiveDate,
        #[case] expected_delay: i64,
        #[case] expected_level: AlertLevel,
    ) {
        let graph = bike_graph();
        let schedules = vec![
            schedule("FRAME", Some(date(11, 18))),
            schedule("WHEEL", Some(date(11, 10))),
            schedule("SPOKE", Some(date(11, 10))),
        ];
        let config = PlanningConfig::default();
        let analyzer = DeliveryAnalyzer::new(&graph, &schedules, &config);

        let verdict = analyzer.analyze_order(&order("SO-1", "BIKE", due));
        assert!(!verdict.can_deliver);
        assert_eq!(verdict.delay_days, expected_delay);
        assert_eq!(verdict.alert_level, expected_level);
    }

    #[test]
    fn test_missing_capacity_material_is_skipped() {
        let graph = bike_graph();
        let schedules = vec![
            schedule("FRAME", Some(date(11, 30))),
            schedule("WHEEL", Some(date(11, 10))),
            schedule("SPOKE", None),
        ];
        let config = PlanningConfig::default();
        let analyzer = DeliveryAnalyzer::new(&graph, &schedules, &config);

        let verdict = analyzer.analyze_order(&order("SO-1", "BIKE", date(11, 20)));
        assert_eq!(verdict.estimated_finish_date, Some(date(11, 30)));
        assert_eq!(verdict.bottleneck_material.as_deref(), Some("FRAME"));
        assert_eq!(verdict.delay_days, 10);
        assert_eq!(verdict.alert_level, AlertLevel::Red);
        assert_eq!(verdict.involved_material_count, 3);

        // WHEEL 子樹只有 SPOKE，沒有任何完成日期
        let wheel = analyzer.analyze_order(&order("SO-2", "WHEEL", date(11, 20)));
        assert_eq!(wheel.alert_level, AlertLevel::Unschedulable);
        assert_eq!(wheel.estimated_finish_date, None);
        assert_eq!(wheel.delay_days, 9999);
        assert_eq!(wheel.bottleneck_material, None);
        assert_eq!(wheel.involved_material_count, 1);
        assert!(!wheel.can_deliver);
    }

    #[test]
    fn test_scheduled_sibling_decides_delivery() {
        let graph = BomGraph::from_edges(vec![
            BomEdge::new("P", "A", Decimal::ONE, 1, 2),
            BomEdge::new("P", "B", Decimal::ONE, 1, 2),
        ]);
        let schedules = vec![schedule("A", Some(date(11, 5))), schedule("B", None)];
        let config = PlanningConfig::default();
        let analyzer = DeliveryAnalyzer::new(&graph, &schedules, &config);

        let verdict = analyzer.analyze_order(&order("SO-1", "P", date(11, 20)));
        assert_eq!(verdict.estimated_finish_date, Some(date(11, 5)));
        assert_eq!(verdict.bottleneck_material.as_deref(), Some("A"));
        assert!(verdict.can_deliver);
        assert_eq!(verdict.delay_days, 0);
        assert_eq!(verdict.alert_level, AlertLevel::Normal);
    }

    #[test]
    fn test_all_materials_unschedulable() {
        let graph = bike_graph();
        let schedules = vec![
            schedule("FRAME", None),
            schedule("WHEEL", None),
            schedule("SPOKE", None),
        ];
        let config = PlanningConfig::default();
        let analyzer = DeliveryAnalyzer::new(&graph, &schedules, &config);

        let verdict = analyzer.analyze_order(&order("SO-1", "BIKE", date(11, 20)));
        assert_eq!(verdict.alert_level, AlertLevel::Unschedulable);
        assert_eq!(verdict.estimated_finish_date, None);
        assert_eq!(verdict.bottleneck_material, None);
        assert_eq!(verdict.delay_days, 9999);
    }

    #[test]
    fn test_product_without_bom_is_unschedulable() {
        let graph = bike_graph();
        let schedules = vec![schedule("FRAME", Some(date(11, 10)))];
        let config = PlanningConfig::default();
        let analyzer = DeliveryAnalyzer::new(&graph, &schedules, &config);

        let verdict = analyzer.analyze_order(&order("SO-9", "SCOOTER", date(11, 20)));
        assert_eq!(verdict.alert_level, AlertLevel::Unschedulable);
        assert_eq!(verdict.bottleneck_material, None);
        assert_eq!(verdict.involved_material_count, 0);
        assert_eq!(verdict.delay_days, 9999);
    }

    #[test]
    fn test_summary_and_alerts() {
        let graph = bike_graph();
        let schedules = vec![
            schedule("FRAME", Some(date(11, 18))),
            schedule("WHEEL", Some(date(11, 10))),
            schedule("SPOKE", Some(date(11, 10))),
        ];
        let config = PlanningConfig::default();
        let analyzer = DeliveryAnalyzer::new(&graph, &schedules, &config);

        let verdicts = analyzer.analyze(&[
            order("SO-1", "BIKE", date(11, 20)),
            order("SO-2", "BIKE", date(11, 17)),
            order("SO-3", "BIKE", date(11, 10)),
            order("SO-4", "WHEEL", date(11, 7)),
            order("SO-5", "SCOOTER", date(11, 20)),
        ]);

        let summary = DeliverySummary::from_verdicts(&verdicts);
        assert_eq!(summary.order_count, 5);
        assert_eq!(summary.on_time_count, 1);
        assert_eq!(summary.delayed_count, 4);
        assert_eq!(summary.on_time_rate_pct, Decimal::from(20));
        assert_eq!(summary.red_count, 1);
        assert_eq!(summary.yellow_count, 2);
        assert_eq!(summary.unschedulable_count, 1);
        assert_eq!(summary.total_delay_days, 1 + 8 + 3 + 9999);

        let delayed = delayed_orders(&verdicts);
        let ids: Vec<_> = delayed.iter().map(|v| v.order_id.as_str()).collect();
        assert_eq!(ids, vec!["SO-5", "SO-3", "SO-4", "SO-2"]);

        let alerts = DeliveryAlerts::from_verdicts(&verdicts);
        assert_eq!(alerts.red.len(), 1);
        assert_eq!(alerts.red[0].order_id, "SO-3");
        assert_eq!(alerts.yellow.len(), 2);
        assert!(!alerts.is_empty());
    }
}
