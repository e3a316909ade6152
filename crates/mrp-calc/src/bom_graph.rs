//! BOM 圖
//!
//! 以父件 → 子件的邊組成有向圖，保留輸入順序，提供子件查詢、
//! 循環檢測與子樹遍歷。

use mrp_core::{BomEdge, CycleError};
use std::collections::{HashMap, HashSet};

/// 深度優先搜尋的節點標記（未出現在表中即為未訪問）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitMark {
    InProgress,
    Done,
}

/// BOM 圖
#[derive(Debug, Clone, Default)]
pub struct BomGraph {
    /// 所有邊（輸入順序）
    edges: Vec<BomEdge>,

    /// 父件 → 子件邊的索引
    children: HashMap<String, Vec<usize>>,

    /// 父件首次出現的順序（讓檢測結果可重現）
    parents: Vec<String>,
}

impl BomGraph {
    /// 創建空的 BOM 圖
    pub fn new() -> Self {
        Self::default()
    }

    /// 從邊集合建立 BOM 圖
    pub fn from_edges(edges: Vec<BomEdge>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    /// 添加一條 BOM 關係
    pub fn add_edge(&mut self, edge: BomEdge) {
        let index = self.edges.len();
        match self.children.get_mut(&edge.parent_code) {
            Some(indices) => indices.push(index),
            None => {
                self.parents.push(edge.parent_code.clone());
                self.children.insert(edge.parent_code.clone(), vec![index]);
            }
        }
        self.edges.push(edge);
    }

    pub fn edges(&self) -> &[BomEdge] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// 圖中出現過的物料數（父件與子件聯集）
    pub fn material_count(&self) -> usize {
        self.edges
            .iter()
            .flat_map(|e| [e.parent_code.as_str(), e.child_code.as_str()])
            .collect::<HashSet<_>>()
            .len()
    }

    /// 直接子件（按輸入順序）
    pub fn children_of<'a>(
        &'a self,
        material_code: &str,
    ) -> impl DoubleEndedIterator<Item = &'a BomEdge> + 'a {
        let indices = self
            .children
            .get(material_code)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        indices.iter().map(move |&i| &self.edges[i])
    }

    pub fn has_children(&self, material_code: &str) -> bool {
        self.children.contains_key(material_code)
    }

    /// 是否為有向無環圖
    pub fn is_acyclic(&self) -> bool {
        self.validate_acyclic().is_ok()
    }

    /// 檢測循環引用
    ///
    /// 自引用直接視為單節點循環；其餘以三色標記的深度優先搜尋檢測，
    /// 遇到指向「處理中」節點的邊即返回完整的循環路徑。
    pub fn validate_acyclic(&self) -> Result<(), CycleError> {
        if let Some(edge) = self.edges.iter().find(|e| e.is_self_reference()) {
            return Err(CycleError::self_loop(&edge.parent_code));
        }

        let mut marks: HashMap<&str, VisitMark> = HashMap::new();

        for root in &self.parents {
            if marks.contains_key(root.as_str()) {
                continue;
            }

            // 顯式堆疊：(節點, 下一個要檢查的子件索引)，堆疊本身即為當前路徑
            let mut stack: Vec<(&str, usize)> = vec![(root.as_str(), 0)];
            marks.insert(root.as_str(), VisitMark::InProgress);

            while let Some(frame) = stack.last_mut() {
                let (node, next) = *frame;
                let children = self
                    .children
                    .get(node)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);

                if next >= children.len() {
                    marks.insert(node, VisitMark::Done);
                    stack.pop();
                    continue;
                }

                frame.1 += 1;
                let child = self.edges[children[next]].child_code.as_str();

                match marks.get(child) {
                    None => {
                        marks.insert(child, VisitMark::InProgress);
                        stack.push((child, 0));
                    }
                    Some(VisitMark::InProgress) => {
                        let start = stack
                            .iter()
                            .position(|(n, _)| *n == child)
                            .unwrap_or(0);
                        let mut path: Vec<String> =
                            stack[start..].iter().map(|(n, _)| n.to_string()).collect();
                        path.push(child.to_string());
                        return Err(CycleError::new(path));
                    }
                    Some(VisitMark::Done) => {}
                }
            }
        }

        Ok(())
    }

    /// 子樹中所有物料（不含根）
    ///
    /// 深度優先前序、按邊的輸入順序；每個物料只出現一次。
    /// 已訪問集合保證即使圖中有環也會結束。
    pub fn subtree_materials(&self, root_code: &str) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut materials = Vec::new();
        let mut stack: Vec<&str> = self
            .children_of(root_code)
            .rev()
            .map(|e| e.child_code.as_str())
            .collect();

        while let Some(code) = stack.pop() {
            if code == root_code || !seen.insert(code) {
                continue;
            }
            materials.push(code.to_string());
            stack.extend(self.children_of(code).rev().map(|e| e.child_code.as_str()));
        }

        materials
    }
}

impl FromIterator<BomEdge> for BomGraph {
    fn from_iter<I: IntoIterator<Item = BomEdge>>(iter: I) -> Self {
        Self::from_edges(iter.into_iter().collect())
    }
}
