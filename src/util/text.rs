/// テキスト・数値整形ユーティリティ。
///
/// 表示用スコアの丸めと共通の文字列整形を提供します。

/// スコアを小数第2位に丸める。
///
/// 表示と集計の両方で同じ丸め規則を使用します。
#[must_use]
pub fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 空白区切りでトークン列を結合する。
///
/// 正規化済みテキストの最終的な再結合に使用します。
#[must_use]
pub fn join_tokens(tokens: &[String]) -> String {
    tokens.join(" ")
}
