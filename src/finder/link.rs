//! `Link` 分页头解析（RFC 5988）
//!
//! 代理对该头部原样透传，只有组件需要总页数时才在这里解析。

use reqwest::Url;

/// 相对链接的解析基准
const RELATIVE_BASE: &str = "http://localhost/";

/// 单个链接项：目标地址与 rel 列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry<'a> {
  pub target: &'a str,
  pub rels: Vec<&'a str>,
}

/// 拆分 `Link` 头中的所有链接项
///
/// 目标地址以 `<...>` 界定，因此地址内部的逗号和分号不会打断解析。
pub fn entries(value: &str) -> Vec<LinkEntry<'_>> {
  let mut out = Vec::new();
  let mut rest = value;

  while let Some(start) = rest.find('<') {
    let after = &rest[start + 1..];
    let Some(end) = after.find('>') else {
      break;
    };
    let target = after[..end].trim();
    let params_and_tail = &after[end + 1..];
    let params_end = params_and_tail.find('<').unwrap_or(params_and_tail.len());
    let params = &params_and_tail[..params_end];

    let mut rels = Vec::new();
    for param in params.split([';', ',']) {
      let Some((key, val)) = param.split_once('=') else {
        continue;
      };
      if key.trim().eq_ignore_ascii_case("rel") {
        rels.extend(val.trim().trim_matches('"').split_whitespace());
      }
    }

    out.push(LinkEntry { target, rels });
    rest = &params_and_tail[params_end..];
  }

  out
}

/// 取出 `last` 关系中 `page` 参数，即总页数
pub fn last_page(value: &str) -> Option<u32> {
  let entry = entries(value)
    .into_iter()
    .find(|e| e.rels.iter().any(|r| r.eq_ignore_ascii_case("last")))?;

  let base = Url::parse(RELATIVE_BASE).ok()?;
  let url = base.join(entry.target).ok()?;
  let page = url
    .query_pairs()
    .find(|(k, _)| k == "page")
    .map(|(_, v)| v.into_owned())?;
  page.trim().parse().ok()
}

/// 总页数，缺失或无法解析时为 1
pub fn page_count(value: Option<&str>) -> u32 {
  value.and_then(last_page).unwrap_or(1)
}
