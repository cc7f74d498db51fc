use criterion::{criterion_group, criterion_main, Criterion};

use mailrules::forward::RecordingForwarder;
use mailrules::{Action, AutomationEngine, ConditionField, Email, RuleDefinition};

fn engine_with_rules(count: usize) -> AutomationEngine<RecordingForwarder> {
    let mut engine = AutomationEngine::new(RecordingForwarder::new());
    for i in 0..count {
        engine.create_rule(
            RuleDefinition::new(format!("rule {i}"))
                .when(ConditionField::From, format!("sender{i}@example.com"))
                .when(ConditionField::Subject, format!("topic {i}"))
                .then(Action::label(format!("label-{i}"))),
        );
    }
    engine
}

fn bench_process_email(c: &mut Criterion) {
    let engine = engine_with_rules(100);
    let email = Email::new(
        "sender42@example.com",
        "Re: Topic 42 follow-up",
        "Body text that is long enough to make case folding show up. ".repeat(20),
    );

    c.bench_function("process_email_100_rules", |b| {
        b.iter(|| {
            let mut e = email.clone();
            engine.process_email(&mut e)
        })
    });
}

criterion_group!(benches, bench_process_email);
criterion_main!(benches);
