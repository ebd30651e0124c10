//! Pure string transforms used to derive identifiers from a branch name

/// Lowercase `input`, replace every run of non-alphanumeric characters with
/// `separator` and trim separators from both ends.
fn slugify(input: &str, separator: char) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(separator);
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Slug usable as a git remote name: `Feature/Add-Search` -> `feature_add_search`
pub fn remote_slug(branch_name: &str) -> String {
    slugify(branch_name, '_')
}

/// URL-safe slug usable as an app name: `Feature/Add_Search` -> `feature-add-search`
pub fn app_slug(branch_name: &str) -> String {
    slugify(branch_name, '-')
}

/// Leading run of digits of a branch name, if any.
///
/// `"48586573-pg-tags"` yields `Some("48586573")`, `"hotfix-login"` yields `None`.
pub fn ticket_prefix(branch_name: &str) -> Option<String> {
    let digits: String = branch_name
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Replace the top-level domain of the host in a git URL with `account`.
///
/// Handles both scp-like (`git@heroku.com:app.git`) and URL
/// (`https://git.heroku.com/app.git`) forms. URLs whose host has no dot are
/// returned unchanged.
pub fn rewrite_git_host(git_url: &str, account: &str) -> String {
    let (prefix, rest) = match git_url.find("://") {
        Some(idx) => git_url.split_at(idx + 3),
        None => ("", git_url),
    };

    let host_start = rest.find('@').map(|i| i + 1).unwrap_or(0);
    let host_end = rest[host_start..]
        .find([':', '/'])
        .map(|i| host_start + i)
        .unwrap_or(rest.len());

    let host = &rest[host_start..host_end];
    let Some(tld_start) = host.rfind('.') else {
        return git_url.to_string();
    };

    format!(
        "{}{}{}.{}{}",
        prefix,
        &rest[..host_start],
        &host[..tld_start],
        account,
        &rest[host_end..]
    )
}
