use std::collections::BTreeMap;

use crate::domain::{PlayerId, TableId};

/// Перемещение одного игрока между столами при ребалансировке.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebalanceMove {
    pub player_id: PlayerId,
    pub from_table: TableId,
    pub to_table: TableId,
}

/// План ребалансировки:
///   - перемещения в порядке выполнения;
///   - столы, которые после перемещений опустеют (их закрываем);
///   - итоговое распределение игроков.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RebalancePlan {
    pub moves: Vec<RebalanceMove>,
    pub broken_tables: Vec<TableId>,
    pub final_distribution: BTreeMap<TableId, Vec<PlayerId>>,
}

impl RebalancePlan {
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Сбалансированы ли столы: max - min <= max_seat_diff.
pub fn is_balanced(tables: &BTreeMap<TableId, Vec<PlayerId>>, max_seat_diff: u8) -> bool {
    let counts = tables.values().map(|p| p.len());
    match (counts.clone().min(), counts.max()) {
        (Some(min), Some(max)) => max - min <= max_seat_diff as usize,
        _ => true,
    }
}

/// Основной алгоритм ребалансировки.
///
/// 1. Если всех оставшихся можно рассадить за меньшее число столов,
///    самый пустой стол «ломается»: его игроки уходят на самые пустые
///    из остальных столов.
/// 2. Пока разница между самым полным и самым пустым столом больше
///    `max_seat_diff`, один игрок переезжает с полного на пустой.
///
/// Выбор столов и игроков детерминирован (по id).
pub fn compute_rebalance_plan(
    tables: &BTreeMap<TableId, Vec<PlayerId>>,
    table_size: u8,
    max_seat_diff: u8,
) -> RebalancePlan {
    let mut dist = tables.clone();
    for players in dist.values_mut() {
        players.sort_unstable();
        players.dedup();
    }

    let mut moves = Vec::new();
    let mut broken_tables = Vec::new();
    let table_size = table_size.max(1) as usize;

    // 1. Ломаем лишние столы.
    loop {
        let total: usize = dist.values().map(Vec::len).sum();
        let needed = total.div_ceil(table_size).max(1);
        if dist.len() <= needed {
            break;
        }

        // Самый пустой стол; при равенстве с большим id.
        let Some(victim) = dist
            .iter()
            .min_by(|a, b| a.1.len().cmp(&b.1.len()).then(b.0.cmp(a.0)))
            .map(|(id, _)| *id)
        else {
            break;
        };

        let players = dist.remove(&victim).unwrap_or_default();
        let mut stuck = Vec::new();
        for player_id in players {
            match emptiest_with_room(&dist, table_size) {
                Some(to) => {
                    dist.entry(to).or_default().push(player_id);
                    moves.push(RebalanceMove {
                        player_id,
                        from_table: victim,
                        to_table: to,
                    });
                }
                None => stuck.push(player_id),
            }
        }

        if !stuck.is_empty() {
            dist.insert(victim, stuck);
            break;
        }
        broken_tables.push(victim);
    }

    // 2. Выравниваем оставшиеся.
    loop {
        let Some((max_id, max_cnt)) = dist
            .iter()
            .map(|(id, p)| (*id, p.len()))
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        else {
            break;
        };
        let Some((min_id, min_cnt)) = dist
            .iter()
            .map(|(id, p)| (*id, p.len()))
            .min_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        else {
            break;
        };

        if max_id == min_id || max_cnt - min_cnt <= max_seat_diff as usize {
            break;
        }

        let Some(player_id) = dist.get_mut(&max_id).and_then(|v| v.pop()) else {
            break;
        };
        dist.entry(min_id).or_default().push(player_id);
        moves.push(RebalanceMove {
            player_id,
            from_table: max_id,
            to_table: min_id,
        });
    }

    RebalancePlan {
        moves,
        broken_tables,
        final_distribution: dist,
    }
}

fn emptiest_with_room(dist: &BTreeMap<TableId, Vec<PlayerId>>, table_size: usize) -> Option<TableId> {
    dist.iter()
        .filter(|(_, p)| p.len() < table_size)
        .min_by(|a, b| a.1.len().cmp(&b.1.len()).then(a.0.cmp(b.0)))
        .map(|(id, _)| *id)
}
