// ==========================================
// 游泳比赛编组系统 - 排序键
// ==========================================
// 职责: "缺失值排在最后" 的显式比较语义
// 红线: 不依赖平台对空值的默认排序
// ==========================================

use std::cmp::Ordering;

/// 可选排序键：None 大于任何实际值
///
/// 报名成绩、比赛成绩、组次、道次缺失时一律沉底
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingLast<T>(pub Option<T>);

impl<T: Ord> PartialOrd for MissingLast<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> Ord for MissingLast<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sorts_after_any_value() {
        assert!(MissingLast(Some(i64::MAX)) < MissingLast(None));
        assert!(MissingLast(Some(-5)) < MissingLast(Some(3)));
        assert_eq!(MissingLast::<i64>(None).cmp(&MissingLast(None)), Ordering::Equal);

        let mut keys = vec![MissingLast(None), MissingLast(Some(7u32)), MissingLast(Some(1))];
        keys.sort();
        assert_eq!(keys, vec![MissingLast(Some(1)), MissingLast(Some(7)), MissingLast(None)]);
    }
}
