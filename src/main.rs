use std::io::{self, Read};

use bumpalo::Bump;
use clap::Parser;
use earley_analysis::*;

/// 从标准输入读取 CFG 文本, 对命令行给出的句子做 Earley 分析.
#[derive(clap::Parser)]
struct AppArgs {
    #[clap(short, long)]
    symbol_start: String,
    /// 句子的终结符序列, 结尾的 eof 自动补上.
    words: Vec<String>,
}

fn main() {
    #[cfg(debug_assertions)]
    {
        use tracing::level_filters::LevelFilter;
        use tracing_subscriber::{
            Layer, fmt, layer::SubscriberExt, registry, util::SubscriberInitExt,
        };

        let layer = fmt::layer()
            .without_time()
            .with_writer(io::stderr)
            .with_filter(LevelFilter::TRACE);
        registry().with(layer).init();
    }

    let args = AppArgs::parse();
    let mut inp = String::new();
    io::stdin().read_to_string(&mut inp).unwrap();
    let bump = Bump::new();
    let grammar = Grammar::from_cfg(&inp, args.symbol_start.as_str().into(), &bump).unwrap();
    for prod in grammar.prods() {
        println!("{:>4} {}", grammar.index_of_prod(prod).unwrap(), prod);
    }
    println!();
    let sentence: Vec<Terminal> = args
        .words
        .iter()
        .map(|w| Terminal::from(w.as_str()))
        .chain([EOF])
        .collect();
    let result = Chart::parse(&grammar, &sentence).unwrap();
    for (i, set) in result.chart().sets().iter().enumerate() {
        println!("---------- Level {i}");
        for (j, item) in set.items().iter().enumerate() {
            println!("{j}: {item:?}");
        }
        println!();
    }
    match &result {
        ParseResult::Accepted { chart, derivation } => {
            println!("--- Accepted ---");
            println!("{}", derivation.render(chart));
        }
        ParseResult::Rejected { .. } => {
            println!("--- Rejected ---");
        }
    }
}
