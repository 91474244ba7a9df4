//! Folds the flat rows of the filtered report into the nested
//! pickup point -> receptions -> items tree.
//!
//! Pickup points keep the order in which they first appear in the row
//! stream. Receptions of each pickup point are sorted by open time
//! ascending; items keep row order. A reception whose rows carry no item
//! gets `items: None` rather than an empty list.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use crate::{
    model::{City, Item, ItemType, PickupPoint, Reception, ReceptionStatus},
    pvz::repo_types::PvzListRow,
    validation::validate_uuid,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupPointReport {
    pub pickup_point: PickupPoint,
    pub receptions: Vec<ReceptionReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceptionReport {
    pub reception: Reception,
    pub items: Option<Vec<Item>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("invalid {field} identifier {id}")]
    InvalidId { field: &'static str, id: Uuid },
    #[error("unknown {field} code {code}")]
    UnknownCode { field: &'static str, code: i16 },
    #[error("item {0} is missing its timestamp or type")]
    IncompleteItem(Uuid),
    #[error("reception {reception} listed under pickup points {first} and {second}")]
    ReceptionOwnerMismatch {
        reception: Uuid,
        first: Uuid,
        second: Uuid,
    },
}

struct Group {
    report: PickupPointReport,
    receptions: HashMap<Uuid, usize>,
}

pub fn aggregate<I>(rows: I) -> Result<Vec<PickupPointReport>, AggregateError>
where
    I: IntoIterator<Item = PvzListRow>,
{
    let mut groups: Vec<Group> = Vec::new();
    let mut by_pvz: HashMap<Uuid, usize> = HashMap::new();
    let mut owners: HashMap<Uuid, Uuid> = HashMap::new();

    for row in rows {
        let pvz_id = checked("pvz", row.pvz_id)?;
        let reception_id = checked("reception", row.reception_id)?;

        match owners.get(&reception_id) {
            Some(&owner) if owner != pvz_id => {
                return Err(AggregateError::ReceptionOwnerMismatch {
                    reception: reception_id,
                    first: owner,
                    second: pvz_id,
                })
            }
            Some(_) => {}
            None => {
                owners.insert(reception_id, pvz_id);
            }
        }

        let gi = match by_pvz.get(&pvz_id) {
            Some(&i) => i,
            None => {
                let city = City::from_code(row.city).ok_or(AggregateError::UnknownCode {
                    field: "city",
                    code: row.city,
                })?;
                groups.push(Group {
                    report: PickupPointReport {
                        pickup_point: PickupPoint {
                            id: pvz_id,
                            registration_date: row.registration_date,
                            city,
                        },
                        receptions: Vec::new(),
                    },
                    receptions: HashMap::new(),
                });
                by_pvz.insert(pvz_id, groups.len() - 1);
                groups.len() - 1
            }
        };
        let group = &mut groups[gi];

        let ri = match group.receptions.get(&reception_id) {
            Some(&i) => i,
            None => {
                let status =
                    ReceptionStatus::from_code(row.status).ok_or(AggregateError::UnknownCode {
                        field: "reception status",
                        code: row.status,
                    })?;
                group.report.receptions.push(ReceptionReport {
                    reception: Reception {
                        id: reception_id,
                        pvz_id,
                        date_time: row.reception_date_time,
                        status,
                    },
                    items: None,
                });
                let i = group.report.receptions.len() - 1;
                group.receptions.insert(reception_id, i);
                i
            }
        };

        if let Some(item) = item_of(&row, reception_id)? {
            group.report.receptions[ri]
                .items
                .get_or_insert_with(Vec::new)
                .push(item);
        }
    }

    Ok(groups
        .into_iter()
        .map(|mut g| {
            g.report
                .receptions
                .sort_by_key(|r| r.reception.date_time);
            g.report
        })
        .collect())
}

fn checked(field: &'static str, id: Uuid) -> Result<Uuid, AggregateError> {
    validate_uuid(id).map_err(|_| AggregateError::InvalidId { field, id })
}

fn item_of(row: &PvzListRow, reception_id: Uuid) -> Result<Option<Item>, AggregateError> {
    let Some(id) = row.item_id else {
        return Ok(None);
    };
    let id = checked("item", id)?;
    let (Some(date_time), Some(code)) = (row.item_date_time, row.item_type) else {
        return Err(AggregateError::IncompleteItem(id));
    };
    let item_type = ItemType::from_code(code).ok_or(AggregateError::UnknownCode {
        field: "item type",
        code,
    })?;
    Ok(Some(Item {
        id,
        reception_id,
        date_time,
        item_type,
    }))
}
