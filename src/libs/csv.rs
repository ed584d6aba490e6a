//! 客户数据的 CSV 编解码。
//!
//! 和前端模板保持一致：固定 12 列表头，文件开头带 BOM，
//! 互动记录以 JSON 数组文本内嵌在最后一个字段里。

use crate::{
    common::{Customer, CustomerStatus, Interaction},
    libs::{gen_id, TIME},
    log, Response,
};

/// 固定表头，列顺序敏感
pub const CSV_HEADER: [&str; 12] = [
    "id",
    "name",
    "phone",
    "email",
    "company",
    "address",
    "city",
    "linkedin",
    "status",
    "followUpDate",
    "followUpTime",
    "interactions",
];
/// 导出文件名
pub const EXPORT_FILENAME: &str = "customers.csv";
const BOM: char = '\u{feff}';

/// 解码结果，skipped 为被跳过的数据行数
#[derive(Debug)]
pub struct DecodedCustomers {
    pub customers: Vec<Customer>,
    pub skipped: usize,
}

/// 含逗号、引号或换行的字段整体加引号，内部引号翻倍
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

/// 引号感知的行切分。引号翻转字段内状态，
/// 引号内的连续两个引号是一个字面引号，引号外的逗号结束当前字段
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => fields.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
    }
    fields.push(current);
    fields
}

/// 客户列表编码成完整的 CSV 文本，行尾为 LF
pub fn encode_customers(customers: &[Customer]) -> Result<String, Response> {
    let mut lines = Vec::with_capacity(customers.len() + 1);
    lines.push(format!("{}{}", BOM, CSV_HEADER.join(",")));
    for customer in customers {
        let interactions = serde_json::to_string(&customer.interactions)?;
        let row = [
            customer.id.as_str(),
            customer.name.as_str(),
            customer.phone.as_str(),
            customer.email.as_str(),
            customer.company.as_str(),
            customer.address.as_deref().unwrap_or(""),
            customer.city.as_deref().unwrap_or(""),
            customer.linkedin.as_deref().unwrap_or(""),
            customer.status.as_str(),
            customer.follow_up_date.as_deref().unwrap_or(""),
            customer.follow_up_time.as_deref().unwrap_or(""),
            interactions.as_str(),
        ]
        .map(escape_field)
        .join(",");
        lines.push(row);
    }
    Ok(lines.join("\n"))
}

/// CSV 文本解码成客户列表。
///
/// 表头不符整体失败；数据行字段数不对、缺姓名或电话、
/// 状态不在取值范围内时只跳过该行；互动字段解析失败按空列表处理。
/// 每位客户的 ID 一律重新生成，导入永远是追加而不是覆盖。
pub fn decode_customers(text: &str) -> Result<DecodedCustomers, Response> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty());
    let Some(header) = lines.next() else {
        return Err(Response::invalid_format("CSV 文件为空"));
    };
    let header: Vec<String> = split_csv_line(header)
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();
    if header != CSV_HEADER {
        return Err(Response::invalid_format("CSV 表头与客户模板不一致"));
    }
    let mut customers = Vec::new();
    let mut skipped = 0;
    for (index, line) in lines.enumerate() {
        let fields = split_csv_line(line);
        if fields.len() != CSV_HEADER.len() {
            log!("第{}行有{}个字段，与表头不符，跳过该行", index + 1, fields.len());
            skipped += 1;
            continue;
        }
        let name = fields[1].trim();
        let phone = fields[2].trim();
        if name.is_empty() || phone.is_empty() {
            log!("第{}行缺少姓名或电话，跳过该行", index + 1);
            skipped += 1;
            continue;
        }
        let Some(status) = CustomerStatus::parse(fields[8].trim()) else {
            log!("第{}行状态`{}`不在取值范围内，跳过该行", index + 1, fields[8]);
            skipped += 1;
            continue;
        };
        let interactions =
            serde_json::from_str::<Vec<Interaction>>(&fields[11]).unwrap_or_default();
        let time = TIME::now()?;
        let mut customer = Customer {
            // 行号混进发号素材，同一批里的同名客户也各有各的 ID
            id: gen_id(&time, &format!("{}-{}", name, index)),
            name: name.to_owned(),
            phone: phone.to_owned(),
            email: fields[3].clone(),
            company: fields[4].clone(),
            address: non_empty(&fields[5]),
            city: non_empty(&fields[6]),
            linkedin: non_empty(&fields[7]),
            status,
            interactions,
            follow_up_date: non_empty(&fields[9]),
            follow_up_time: non_empty(&fields[10]),
        };
        customer.normalize();
        customers.push(customer);
    }
    Ok(DecodedCustomers { customers, skipped })
}

fn non_empty(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_owned())
    }
}
