use crate::models::value::RawItem;

/// The standard planning poker deck: 0 1 2 3 5 7 plus "?" and "Coffee".
pub fn fibonacci() -> Vec<RawItem> {
    let mut items: Vec<RawItem> = [0.0, 1.0, 2.0, 3.0, 5.0, 7.0]
        .iter()
        .map(|&magnitude| RawItem::numeric(magnitude))
        .collect();
    items.push(RawItem::named("?"));
    items.push(RawItem::named("Coffee"));
    items
}

/// A label-only deck for coarse relative sizing.
pub fn t_shirt_sizes() -> Vec<RawItem> {
    ["XS", "S", "M", "L", "XL"]
        .iter()
        .map(|name| RawItem::named(name))
        .collect()
}
